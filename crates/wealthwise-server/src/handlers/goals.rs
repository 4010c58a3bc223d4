//! Savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::{AppError, AppState, CurrentUser, Saved, SuccessResponse};
use wealthwise_core::{Goal, GoalUpdate, NewGoal};

/// GET /api/goals - List goals in insertion order
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Goal>>, AppError> {
    Ok(Json(state.load(&current).await?.goals))
}

/// POST /api/goals - Add a goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewGoal>,
) -> Result<Json<Saved<Goal>>, AppError> {
    let saved = state
        .update(&current, |data| data.add_goal(req, Utc::now()).cloned())
        .await?;
    Ok(Json(saved))
}

/// PATCH /api/goals/:id - Update some fields of a goal
pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<GoalUpdate>,
) -> Result<Json<Saved<Goal>>, AppError> {
    let saved = state
        .update(&current, |data| data.update_goal(&id, req).cloned())
        .await?;
    Ok(Json(saved))
}

/// DELETE /api/goals/:id
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Saved<SuccessResponse>>, AppError> {
    let saved = state
        .update(&current, |data| {
            data.delete_goal(&id)?;
            Ok(SuccessResponse { success: true })
        })
        .await?;
    Ok(Json(saved))
}
