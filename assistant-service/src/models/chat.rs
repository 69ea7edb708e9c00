//! Chat transcript types and payload normalization.

use serde::{Deserialize, Serialize};

/// Content cap per message when the history is bound for the model.
pub const CHAT_CONTENT_CAP: usize = 1500;
/// Turns kept for a live chat call.
pub const CHAT_HISTORY_CAP: usize = 12;
/// Content cap per message when a conversation is forwarded as a lead.
pub const FORWARD_CONTENT_CAP: usize = 2000;
/// Turns kept in a forwarded transcript.
pub const FORWARD_HISTORY_CAP: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Sanitize a raw message list from the widget: drop empty entries, trim
/// content, cap each message at `content_cap` characters and keep only
/// the most recent `history_cap` turns. Oldest turns are dropped silently.
pub fn normalize_messages(
    messages: &[ChatMessage],
    content_cap: usize,
    history_cap: usize,
) -> Vec<ChatMessage> {
    let mut normalized: Vec<ChatMessage> = messages
        .iter()
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| ChatMessage {
            role: m.role,
            content: m.content.trim().chars().take(content_cap).collect(),
        })
        .collect();

    if normalized.len() > history_cap {
        normalized.drain(..normalized.len() - history_cap);
    }
    normalized
}

/// Most recent user message, if any.
pub fn latest_user_message(messages: &[ChatMessage]) -> Option<&ChatMessage> {
    messages.iter().rev().find(|m| m.role == ChatRole::User)
}
