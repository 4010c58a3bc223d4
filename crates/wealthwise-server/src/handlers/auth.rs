//! Authentication-related handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppError, AppState, CurrentUser, SuccessResponse};
use wealthwise_core::{Backend, ResetOutcome, Session, SignInRequest, SignUpRequest, User};

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Response for the /api/me endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    /// Whether user data goes to the hosted backend
    pub is_online: bool,
    /// Which account provider is in use
    pub auth_provider: String,
}

/// POST /api/auth/signup - Create an account and start a session
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.auth.sign_up(&req).await?;
    Ok(Json(session))
}

/// POST /api/auth/signin - Start a session
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state.auth.sign_in(&req).await?;
    Ok(Json(session))
}

/// POST /api/auth/signout - End the current session
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<SuccessResponse>, AppError> {
    if let Some(token) = &current.token {
        state.auth.sign_out(token).await?;
    }
    state.conversations.write().await.remove(&current.user.id);
    info!(user_id = %current.user.id, "Session ended");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/auth/reset-password - Request a password reset
///
/// Local accounts get a temporary password in the response, which would let
/// any caller take over an account. That is only allowed when authentication
/// is disabled (single-user local dev); otherwise the reset must be done with
/// the CLI on the host.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ResetOutcome>, AppError> {
    if state.config.require_auth && state.auth.issues_temporary_passwords() {
        warn!("Refused local password reset over HTTP");
        return Err(AppError::forbidden(
            "Local accounts can only be reset from the command line: wealthwise reset-password",
        ));
    }

    let outcome = state.auth.reset_password(&req.email).await?;
    Ok(Json(outcome))
}

/// GET /api/me - The signed-in user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Json<MeResponse> {
    Json(MeResponse {
        user: current.user,
        is_online: state.storage.backend() == Backend::Remote && !state.storage.is_degraded(),
        auth_provider: state.auth.provider_name().to_string(),
    })
}
