//! Calculator handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::{AppError, AppState, CurrentUser};
use wealthwise_core::calculators::{budget, compound, fire};
use wealthwise_core::{BudgetSplit, CompoundInputs, CompoundResult, FireInputs, FireProjection};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    /// Defaults to the profile's monthly income
    #[serde(default)]
    pub monthly_income: Option<f64>,
}

/// POST /api/tools/compound - Compound interest projection
pub async fn compound(Json(inputs): Json<CompoundInputs>) -> Result<Json<CompoundResult>, AppError> {
    Ok(Json(compound::project(&inputs)?))
}

/// POST /api/tools/fire - FIRE projection
pub async fn fire(Json(inputs): Json<FireInputs>) -> Result<Json<FireProjection>, AppError> {
    Ok(Json(fire::project(&inputs)?))
}

/// GET /api/tools/fire/defaults - FIRE inputs pre-filled from the profile
pub async fn fire_defaults(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<FireInputs>, AppError> {
    let data = state.load(&current).await?;
    Ok(Json(FireInputs::for_profile(data.profile.as_ref())))
}

/// POST /api/tools/budget - 50/30/20 split of monthly income
pub async fn budget(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<BudgetRequest>,
) -> Result<Json<BudgetSplit>, AppError> {
    let income = match req.monthly_income {
        Some(income) => income,
        None => state
            .load(&current)
            .await?
            .profile
            .map(|p| p.monthly_income)
            .unwrap_or_default(),
    };
    Ok(Json(budget::split(income)?))
}
