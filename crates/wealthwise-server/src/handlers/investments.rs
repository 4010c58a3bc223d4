//! Investment holding handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::{AppError, AppState, CurrentUser, Saved, SuccessResponse};
use wealthwise_core::{Investment, InvestmentUpdate, NewInvestment};

/// GET /api/investments - List holdings in insertion order
pub async fn list_investments(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Investment>>, AppError> {
    Ok(Json(state.load(&current).await?.investments))
}

/// POST /api/investments - Add a holding
pub async fn create_investment(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewInvestment>,
) -> Result<Json<Saved<Investment>>, AppError> {
    let saved = state
        .update(&current, |data| data.add_investment(req, Utc::now()).cloned())
        .await?;
    Ok(Json(saved))
}

/// PATCH /api/investments/:id - Update some fields of a holding
pub async fn update_investment(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<InvestmentUpdate>,
) -> Result<Json<Saved<Investment>>, AppError> {
    let saved = state
        .update(&current, |data| data.update_investment(&id, req).cloned())
        .await?;
    Ok(Json(saved))
}

/// DELETE /api/investments/:id - Remove a holding
pub async fn delete_investment(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Saved<SuccessResponse>>, AppError> {
    let saved = state
        .update(&current, |data| {
            data.delete_investment(&id)?;
            Ok(SuccessResponse { success: true })
        })
        .await?;
    Ok(Json(saved))
}
