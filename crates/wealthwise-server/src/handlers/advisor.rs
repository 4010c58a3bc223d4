//! Advisor chat handlers
//!
//! Each user has one transcript, opened with a time-of-day greeting on first
//! access. Input sent while a reply is pending is rejected with 409.

use std::sync::{Arc, Mutex};

use axum::{extract::State, Extension, Json};
use chrono::{Local, Timelike};
use serde::Deserialize;

use crate::{AppError, AppState, CurrentUser, SuccessResponse};
use wealthwise_core::advisor::{self, ActionOutcome, ChatTurn, Conversation};
use wealthwise_core::UserData;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// Tab id or prompt text from a reply's action button
    pub action: String,
}

/// The user's transcript, created on first use
async fn conversation_for(
    state: &AppState,
    current: &CurrentUser,
    data: &UserData,
) -> Arc<Mutex<Conversation>> {
    if let Some(existing) = state.conversations.read().await.get(&current.user.id) {
        return existing.clone();
    }

    let mut conversations = state.conversations.write().await;
    conversations
        .entry(current.user.id.clone())
        .or_insert_with(|| {
            let opening = advisor::welcome(data.profile.as_ref(), Local::now().hour());
            Arc::new(Mutex::new(Conversation::new(opening)))
        })
        .clone()
}

fn snapshot(conversation: &Mutex<Conversation>) -> Conversation {
    conversation
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// GET /api/advisor - The transcript so far
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Conversation>, AppError> {
    let data = state.load(&current).await?;
    let conversation = conversation_for(&state, &current, &data).await;
    Ok(Json(snapshot(&conversation)))
}

/// POST /api/advisor/message - Send a message and wait for the reply
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ChatTurn>, AppError> {
    let data = state.load(&current).await?;
    let conversation = conversation_for(&state, &current, &data).await;
    let reply = state
        .advisor
        .send(&conversation, &data, &req.message)
        .await?;
    Ok(Json(reply))
}

/// POST /api/advisor/action - Activate an action button
pub async fn run_action(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let data = state.load(&current).await?;
    let conversation = conversation_for(&state, &current, &data).await;
    let outcome = state
        .advisor
        .act(&conversation, &data, &req.action)
        .await?;
    Ok(Json(outcome))
}

/// DELETE /api/advisor - Start over with a fresh greeting
pub async fn reset_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Json<SuccessResponse> {
    state.conversations.write().await.remove(&current.user.id);
    Json(SuccessResponse { success: true })
}
