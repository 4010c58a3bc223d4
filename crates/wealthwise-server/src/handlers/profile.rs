//! Whole-record and profile handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{AppError, AppState, CurrentUser, Saved};
use wealthwise_core::{Profile, UserData};

/// GET /api/data - The user's full record
pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserData>, AppError> {
    Ok(Json(state.load(&current).await?))
}

/// GET /api/profile - The user's profile, `null` before onboarding
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Option<Profile>>, AppError> {
    Ok(Json(state.load(&current).await?.profile))
}

/// PUT /api/profile - Create or replace the profile
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(profile): Json<Profile>,
) -> Result<Json<Saved<Profile>>, AppError> {
    let saved = state
        .update(&current, move |data| {
            data.set_profile(profile.clone())?;
            Ok(profile)
        })
        .await?;
    Ok(Json(saved))
}
