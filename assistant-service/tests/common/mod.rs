use assistant_service::config::{
    AssistantConfig, OpenAiConfig, SmtpConfig, StorageBackendKind, StorageConfig,
};
use assistant_service::services::email::LeadMailer;
use assistant_service::services::providers::{ChatProvider, MockChatProvider};
use assistant_service::services::store::{LeadStore, LocalFileBackend, StoreBackend};
use assistant_service::services::uploads::{BlobStorage, LocalBlobStorage};
use assistant_service::startup::{router, AppState};
use service_core::config::Config as CoreConfig;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub state: AppState,
}

impl TestApp {
    /// Spawn the service on a random port with a canned-reply model,
    /// local storage in a throwaway directory and SMTP disabled.
    pub async fn spawn() -> Self {
        Self::spawn_with_provider(Arc::new(MockChatProvider::new(true))).await
    }

    pub async fn spawn_with_provider(provider: Arc<dyn ChatProvider>) -> Self {
        let data_dir = std::env::temp_dir()
            .join(format!("assistant-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();

        let config = AssistantConfig {
            common: CoreConfig { port: 0 },
            openai: OpenAiConfig {
                api_key: "test-api-key".to_string(),
                model: "gpt-4.1-mini".to_string(),
                base_url: "http://127.0.0.1:1".to_string(),
            },
            smtp: SmtpConfig {
                host: "smtp.test.local".to_string(),
                port: 587,
                user: "test".to_string(),
                password: "test".to_string(),
                from_email: "test@example.com".to_string(),
                from_name: "Test Assistant".to_string(),
                notify_email: "artist@example.com".to_string(),
                enabled: false,
            },
            storage: StorageConfig {
                backend: StorageBackendKind::Local,
                data_dir: data_dir.clone(),
                bucket: String::new(),
            },
        };

        let store_backend: Arc<dyn StoreBackend> = Arc::new(
            LocalFileBackend::new(&data_dir)
                .await
                .expect("Failed to create store backend"),
        );
        let blobs: Arc<dyn BlobStorage> = Arc::new(
            LocalBlobStorage::new(&data_dir)
                .await
                .expect("Failed to create blob storage"),
        );
        let mailer = Arc::new(LeadMailer::new(config.smtp.clone()).expect("Failed to build mailer"));

        let state = AppState {
            config,
            store: LeadStore::new(store_backend),
            provider,
            blobs,
            mailer,
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().expect("No local addr").port();

        let app = router(state.clone());
        tokio::spawn(axum::serve(listener, app).into_future());

        Self {
            address: format!("http://127.0.0.1:{}", port),
            state,
        }
    }
}

/// JSON body for one chat turn.
pub fn chat_body(session_id: &str, messages: &[(&str, &str)]) -> serde_json::Value {
    serde_json::json!({
        "page": "/galerie",
        "sessionId": session_id,
        "messages": messages
            .iter()
            .map(|(role, content)| serde_json::json!({ "role": role, "content": content }))
            .collect::<Vec<_>>(),
    })
}
