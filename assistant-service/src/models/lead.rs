//! Lead records: one per explicit "forward to the artist" action.

use crate::models::chat::ChatMessage;
use crate::services::signals::LeadDraft;
use serde::{Deserialize, Serialize};

/// Manual status workflow. Transitions happen only through operator
/// action on the dashboard; nothing moves a lead automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    #[default]
    New,
    Seen,
    InProgress,
    Replied,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Email,
    Phone,
}

/// A forwarded conversation. Immutable except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantLead {
    pub request_id: String,
    pub created_at: String,
    pub page: String,
    /// Records written before the status workflow existed read as NEW.
    #[serde(default)]
    pub status: LeadStatus,
    pub session_id: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub contact_type: ContactType,
    pub contact_value: String,
    pub transcript: Vec<ChatMessage>,
    #[serde(flatten)]
    pub draft: LeadDraft,
}
