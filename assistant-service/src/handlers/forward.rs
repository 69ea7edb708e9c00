use crate::models::chat::ChatMessage;
use crate::services::assistant::{self, ForwardInput};
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRequest {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub session_id: String,
    pub contact_type: String,
    pub contact_value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardResponse {
    pub ok: bool,
    pub request_id: String,
    pub confirmation: String,
}

pub async fn forward_lead(
    State(state): State<AppState>,
    Json(request): Json<ForwardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = assistant::forward_lead(
        &state.store,
        &state.mailer,
        ForwardInput {
            page: request.page,
            messages: request.messages,
            session_id: request.session_id.clone(),
            contact_type: request.contact_type,
            contact_value: request.contact_value,
        },
    )
    .await?;

    tracing::info!(
        session_id = %request.session_id,
        request_id = %outcome.request_id,
        "Lead forwarded"
    );

    Ok(Json(ForwardResponse {
        ok: true,
        request_id: outcome.request_id,
        confirmation: outcome.confirmation,
    }))
}
