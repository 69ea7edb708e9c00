//! Language-model provider abstraction.
//!
//! The orchestrator only ever sees this trait; swapping between the
//! real OpenAI backend and the mock happens at composition time.

pub mod mock;
pub mod openai;

pub use mock::MockChatProvider;
pub use openai::OpenAiChatProvider;

use crate::models::chat::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Empty reply from provider")]
    EmptyReply,
}

/// Black-box text completion: system prompt + history in, reply out.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// True when credentials are present. Checked up front so an
    /// unconfigured assistant answers 503 instead of failing mid-turn.
    fn is_configured(&self) -> bool;

    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError>;
}
