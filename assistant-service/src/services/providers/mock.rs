//! Mock provider for tests.

use super::{ChatProvider, ProviderError};
use crate::models::chat::ChatMessage;
use async_trait::async_trait;

/// Canned-reply provider. `enabled=false` simulates a service with no
/// credentials configured.
pub struct MockChatProvider {
    enabled: bool,
    reply: String,
}

impl MockChatProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            reply: "Sigur, te pot ajuta cu asta. Ce dimensiune are spatiul?".to_string(),
        }
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            enabled: true,
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn is_configured(&self) -> bool {
        self.enabled
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _messages: &[ChatMessage],
    ) -> Result<String, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock chat provider not enabled".to_string(),
            ));
        }
        Ok(self.reply.clone())
    }
}
