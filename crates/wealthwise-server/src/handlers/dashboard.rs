//! Derived views: dashboard, health score, achievements

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::Local;
use serde::Serialize;

use crate::{AppError, AppState, CurrentUser};
use wealthwise_core::achievements::{self, AchievementStatus};
use wealthwise_core::{dashboard, health, Dashboard, Grade, HealthScore};

#[derive(Serialize)]
pub struct HealthScoreResponse {
    #[serde(flatten)]
    pub score: HealthScore,
    pub grade: Grade,
}

/// GET /api/dashboard - Summary figures for the dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Dashboard>, AppError> {
    let data = state.load(&current).await?;
    Ok(Json(dashboard::summarize(&data, Local::now().date_naive())))
}

/// GET /api/health-score
pub async fn get_health_score(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<HealthScoreResponse>, AppError> {
    let data = state.load(&current).await?;
    let score = health::calculate(data.profile.as_ref(), data.total_invested(), &data.goals);
    Ok(Json(HealthScoreResponse {
        grade: score.grade(),
        score,
    }))
}

/// GET /api/achievements - The catalog with unlock state
pub async fn list_achievements(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<AchievementStatus>>, AppError> {
    let data = state.load(&current).await?;
    Ok(Json(achievements::catalog_status(&data.achievements)))
}
