use crate::models::chat::ChatMessage;
use crate::services::assistant;
use crate::services::signals::LeadDraft;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    pub reply: String,
    pub lead_ready: bool,
    pub lead_draft: LeadDraft,
}

pub async fn chat_turn(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = assistant::handle_turn(
        &state.store,
        state.provider.as_ref(),
        &request.page,
        &request.messages,
        &request.session_id,
    )
    .await?;

    tracing::info!(
        session_id = %request.session_id,
        lead_ready = outcome.lead_ready,
        "Chat turn completed"
    );

    Ok(Json(ChatTurnResponse {
        reply: outcome.reply,
        lead_ready: outcome.lead_ready,
        lead_draft: outcome.lead_draft,
    }))
}
