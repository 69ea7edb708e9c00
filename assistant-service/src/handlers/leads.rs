use crate::models::lead::{AssistantLead, LeadStatus};
use crate::services::store::{compute_daily_overview, DailyOverview};
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct LeadListResponse {
    pub leads: Vec<AssistantLead>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub request_id: String,
    pub status: LeadStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub ok: bool,
    pub lead: AssistantLead,
}

pub async fn list_leads(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leads = state.store.list_leads().await?;
    Ok(Json(LeadListResponse { leads }))
}

pub async fn update_lead_status(
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request_id = request.request_id.trim();
    if request_id.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "requestId is required"
        )));
    }

    let lead = state
        .store
        .update_lead_status(request_id, request.status)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("no lead with id {}", request.request_id))
        })?;

    tracing::info!(
        request_id = %lead.request_id,
        status = ?lead.status,
        "Lead status updated"
    );

    Ok(Json(UpdateStatusResponse { ok: true, lead }))
}

pub async fn leads_overview(
    State(state): State<AppState>,
) -> Result<Json<DailyOverview>, AppError> {
    let leads = state.store.list_leads().await?;
    Ok(Json(compute_daily_overview(&leads)))
}
