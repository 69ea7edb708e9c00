//! Session records: one per distinct widget conversation.

use crate::services::signals::LeadDraft;
use serde::{Deserialize, Serialize};

/// Images kept per session, most recent first.
pub const SESSION_IMAGE_CAP: usize = 8;
/// Stored tail of the visitor's last message.
pub const LAST_USER_MESSAGE_CAP: usize = 400;

/// Continuously-updated record of one visitor's conversation. Never
/// deleted by this service; `forwarded` and `request_id` are sticky.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantSession {
    pub session_id: String,
    pub page: String,
    pub first_seen_at: String,
    pub updated_at: String,
    pub last_user_message: String,
    pub message_count: usize,
    #[serde(default)]
    pub lead_ready: bool,
    #[serde(default)]
    pub forwarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(flatten)]
    pub draft: LeadDraft,
}

/// Per-turn session update computed by the orchestrator.
#[derive(Debug, Clone)]
pub struct SessionUpsert {
    pub session_id: String,
    pub page: String,
    pub message_count: usize,
    pub last_user_message: String,
    pub lead_ready: bool,
    pub draft: LeadDraft,
}
