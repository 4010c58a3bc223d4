//! Storage backend status and reconciliation

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{AppError, AppState, CurrentUser};
use wealthwise_core::{ReconcileOutcome, StorageStatus};

/// GET /api/storage - Selected backend and degraded flag
pub async fn storage_status(State(state): State<Arc<AppState>>) -> Json<StorageStatus> {
    Json(state.storage.status())
}

/// POST /api/storage/reconcile - Push the user's local record to the hosted backend
pub async fn reconcile_storage(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ReconcileOutcome>, AppError> {
    Ok(Json(state.storage.reconcile(&current.owner).await?))
}
