use crate::config::{AssistantConfig, StorageBackendKind};
use crate::handlers;
use crate::services::email::LeadMailer;
use crate::services::providers::{ChatProvider, MockChatProvider, OpenAiChatProvider};
use crate::services::store::{LeadStore, LocalFileBackend, S3Backend, StoreBackend};
use crate::services::uploads::{BlobStorage, LocalBlobStorage, S3BlobStorage};
use crate::services::uploads::MAX_UPLOAD_SIZE;
use aws_config::BehaviorVersion;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AssistantConfig,
    pub store: LeadStore,
    pub provider: Arc<dyn ChatProvider>,
    pub blobs: Arc<dyn BlobStorage>,
    pub mailer: Arc<LeadMailer>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: AssistantConfig) -> Result<Self, AppError> {
        let state = Self::build_state(&config).await?;

        let app = router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    /// Wire the store, blob storage, model provider and mailer. The
    /// storage backend is decided once here; everything downstream
    /// only sees the ports.
    async fn build_state(config: &AssistantConfig) -> Result<AppState, AppError> {
        let (store_backend, blobs): (Arc<dyn StoreBackend>, Arc<dyn BlobStorage>) =
            match config.storage.backend {
                StorageBackendKind::Local => {
                    let dir = &config.storage.data_dir;
                    (
                        Arc::new(LocalFileBackend::new(dir).await?),
                        Arc::new(LocalBlobStorage::new(dir).await?),
                    )
                }
                StorageBackendKind::S3 => {
                    if config.storage.bucket.is_empty() {
                        return Err(AppError::ConfigError(anyhow::anyhow!(
                            "STORAGE_BUCKET is required for the s3 backend"
                        )));
                    }
                    let aws_config =
                        aws_config::defaults(BehaviorVersion::latest()).load().await;
                    let client = aws_sdk_s3::Client::new(&aws_config);
                    (
                        Arc::new(S3Backend::new(client.clone(), config.storage.bucket.clone())),
                        Arc::new(S3BlobStorage::new(client, config.storage.bucket.clone())),
                    )
                }
            };

        let provider: Arc<dyn ChatProvider> = if config.openai.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY not set, chat turns will answer 503");
            Arc::new(MockChatProvider::new(false))
        } else {
            Arc::new(
                OpenAiChatProvider::new(config.openai.clone())
                    .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?,
            )
        };

        let mailer = Arc::new(
            LeadMailer::new(config.smtp.clone()).map_err(AppError::ConfigError)?,
        );

        Ok(AppState {
            config: config.clone(),
            store: LeadStore::new(store_backend),
            provider,
            blobs,
            mailer,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/api/assistant", post(handlers::chat_turn))
        .route("/api/assistant/forward", post(handlers::forward_lead))
        .route(
            "/api/assistant/leads",
            get(handlers::list_leads).patch(handlers::update_lead_status),
        )
        .route(
            "/api/assistant/leads/overview",
            get(handlers::leads_overview),
        )
        .route("/api/assistant/sessions", get(handlers::list_sessions))
        .route("/api/assistant/upload", post(handlers::upload_image))
        .route("/api/assistant/uploads/:name", get(handlers::serve_upload))
        // Leave headroom above the app-level cap so oversized uploads
        // get the handler's error instead of a bare 413.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
