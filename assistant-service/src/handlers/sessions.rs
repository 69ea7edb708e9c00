use crate::models::session::AssistantSession;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<AssistantSession>,
}

pub async fn list_sessions(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let sessions = state.store.list_sessions().await?;
    Ok(Json(SessionListResponse { sessions }))
}
