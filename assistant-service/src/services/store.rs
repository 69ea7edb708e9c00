//! Durable persistence for leads and sessions.
//!
//! Both collections live in one JSON document behind the `StoreBackend`
//! port; the local-file and S3 adapters must be indistinguishable to
//! callers. Every write is read-modify-write over the whole document:
//! there is no per-record locking, and two concurrent writers can
//! clobber each other (last writer wins at the collection level).
//! Expected concurrency per session is one visitor in one tab, so this
//! is a documented limitation rather than a bug to engineer around.

use crate::models::chat::ChatMessage;
use crate::models::lead::{AssistantLead, LeadStatus};
use crate::models::session::{
    AssistantSession, LAST_USER_MESSAGE_CAP, SESSION_IMAGE_CAP, SessionUpsert,
};
use crate::services::signals::LeadDraft;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

const STORE_FILE_NAME: &str = "assistant-leads.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreShape {
    leads: Vec<AssistantLead>,
    sessions: Vec<AssistantSession>,
}

/// Whole-document load/save. Adapters stay dumb; merge logic lives in
/// `LeadStore`.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// `None` when the backing document does not exist yet.
    async fn load(&self) -> Result<Option<Vec<u8>>, AppError>;
    async fn save(&self, data: Vec<u8>) -> Result<(), AppError>;
}

pub struct LocalFileBackend {
    path: PathBuf,
}

impl LocalFileBackend {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).await?;
        }
        Ok(Self {
            path: data_dir.join(STORE_FILE_NAME),
        })
    }
}

#[async_trait]
impl StoreBackend for LocalFileBackend {
    async fn load(&self) -> Result<Option<Vec<u8>>, AppError> {
        match fs::read(&self.path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(anyhow::anyhow!(
                "store read failed: {e}"
            ))),
        }
    }

    async fn save(&self, data: Vec<u8>) -> Result<(), AppError> {
        fs::write(&self.path, data)
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("store write failed: {e}")))
    }
}

pub struct S3Backend {
    client: S3Client,
    bucket: String,
}

impl S3Backend {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StoreBackend for S3Backend {
    async fn load(&self) -> Result<Option<Vec<u8>>, AppError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(STORE_FILE_NAME)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(AppError::StorageError(anyhow::anyhow!(
                    "S3 download failed: {service_err}"
                )));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("S3 body collection failed: {e}")))?
            .into_bytes()
            .to_vec();
        Ok(Some(data))
    }

    async fn save(&self, data: Vec<u8>) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(STORE_FILE_NAME)
            .body(ByteStream::from(data))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("S3 upload failed: {e}")))?;
        Ok(())
    }
}

/// Daily aggregation over leads, computed on demand for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOverview {
    pub today: String,
    pub total_today_leads: usize,
    pub top_types: Vec<(String, usize)>,
    pub top_styles: Vec<(String, usize)>,
    pub top_dimensions: Vec<(String, usize)>,
}

#[derive(Clone)]
pub struct LeadStore {
    backend: Arc<dyn StoreBackend>,
}

impl LeadStore {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// A missing or unparseable document reads as the empty store:
    /// availability over strict durability.
    async fn read_store(&self) -> Result<StoreShape, AppError> {
        let Some(raw) = self.backend.load().await? else {
            return Ok(StoreShape::default());
        };
        match serde_json::from_slice(&raw) {
            Ok(store) => Ok(store),
            Err(e) => {
                tracing::warn!(error = %e, "Store document unparseable, treating as empty");
                Ok(StoreShape::default())
            }
        }
    }

    async fn write_store(&self, store: &StoreShape) -> Result<(), AppError> {
        let raw = serde_json::to_vec_pretty(store)
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("store serialize failed: {e}")))?;
        self.backend.save(raw).await
    }

    /// Prepend the lead; newest first.
    pub async fn create_lead(&self, lead: AssistantLead) -> Result<AssistantLead, AppError> {
        let mut store = self.read_store().await?;
        store.leads.insert(0, lead.clone());
        self.write_store(&store).await?;
        Ok(lead)
    }

    pub async fn list_leads(&self) -> Result<Vec<AssistantLead>, AppError> {
        Ok(self.read_store().await?.leads)
    }

    pub async fn get_lead_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<AssistantLead>, AppError> {
        let store = self.read_store().await?;
        Ok(store
            .leads
            .into_iter()
            .find(|lead| lead.request_id.eq_ignore_ascii_case(request_id)))
    }

    /// Replace only the status; `Ok(None)` when the id is unknown.
    pub async fn update_lead_status(
        &self,
        request_id: &str,
        status: LeadStatus,
    ) -> Result<Option<AssistantLead>, AppError> {
        let mut store = self.read_store().await?;
        let Some(lead) = store
            .leads
            .iter_mut()
            .find(|lead| lead.request_id.eq_ignore_ascii_case(request_id))
        else {
            return Ok(None);
        };
        lead.status = status;
        let updated = lead.clone();
        self.write_store(&store).await?;
        Ok(Some(updated))
    }

    pub async fn get_session(
        &self,
        session_id: &str,
    ) -> Result<Option<AssistantSession>, AppError> {
        let store = self.read_store().await?;
        Ok(store
            .sessions
            .into_iter()
            .find(|session| session.session_id == session_id))
    }

    /// Sessions sorted by `updated_at` descending for the dashboard.
    pub async fn list_sessions(&self) -> Result<Vec<AssistantSession>, AppError> {
        let mut sessions = self.read_store().await?.sessions;
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    /// Create or update the session for this turn.
    ///
    /// Draft fields are overwritten wholesale from the freshly computed
    /// draft: a field detected on an earlier turn can regress to empty
    /// when a later turn fails to re-detect it. `page` and
    /// `last_user_message` fall back to the previous value when the new
    /// one is empty. `forwarded`, `request_id`, `image_urls` and
    /// `first_seen_at` are never touched here.
    pub async fn upsert_session(&self, mut input: SessionUpsert) -> Result<(), AppError> {
        input.last_user_message = input
            .last_user_message
            .chars()
            .take(LAST_USER_MESSAGE_CAP)
            .collect();

        let mut store = self.read_store().await?;
        let now = Utc::now().to_rfc3339();

        if let Some(session) = store
            .sessions
            .iter_mut()
            .find(|session| session.session_id == input.session_id)
        {
            session.draft = input.draft;
            if !input.page.is_empty() {
                session.page = input.page;
            }
            if !input.last_user_message.is_empty() {
                session.last_user_message = input.last_user_message;
            }
            session.message_count = input.message_count;
            session.lead_ready = input.lead_ready;
            session.updated_at = now;
        } else {
            store.sessions.insert(
                0,
                AssistantSession {
                    session_id: input.session_id,
                    page: input.page,
                    first_seen_at: now.clone(),
                    updated_at: now,
                    last_user_message: input.last_user_message,
                    message_count: input.message_count,
                    lead_ready: input.lead_ready,
                    forwarded: false,
                    request_id: None,
                    image_urls: Vec::new(),
                    draft: input.draft,
                },
            );
        }
        self.write_store(&store).await
    }

    /// Sticky: once forwarded, a session stays forwarded and keeps its
    /// request id. No-op when the session does not exist.
    pub async fn mark_session_forwarded(
        &self,
        session_id: &str,
        request_id: &str,
    ) -> Result<(), AppError> {
        let mut store = self.read_store().await?;
        let Some(session) = store
            .sessions
            .iter_mut()
            .find(|session| session.session_id == session_id)
        else {
            return Ok(());
        };
        session.forwarded = true;
        session.request_id = Some(request_id.to_string());
        session.updated_at = Utc::now().to_rfc3339();
        self.write_store(&store).await
    }

    /// Prepend an uploaded image url, most recent first, capped at
    /// [`SESSION_IMAGE_CAP`]. Creates a minimal session when the id has
    /// never been seen (image upload can precede the first chat turn).
    pub async fn add_session_image(
        &self,
        session_id: &str,
        image_url: &str,
    ) -> Result<(), AppError> {
        let mut store = self.read_store().await?;
        let now = Utc::now().to_rfc3339();

        if let Some(session) = store
            .sessions
            .iter_mut()
            .find(|session| session.session_id == session_id)
        {
            session.image_urls.insert(0, image_url.to_string());
            session.image_urls.truncate(SESSION_IMAGE_CAP);
            session.updated_at = now;
        } else {
            store.sessions.insert(
                0,
                AssistantSession {
                    session_id: session_id.to_string(),
                    page: "unknown".to_string(),
                    first_seen_at: now.clone(),
                    updated_at: now,
                    last_user_message: String::new(),
                    message_count: 0,
                    lead_ready: false,
                    forwarded: false,
                    request_id: None,
                    image_urls: vec![image_url.to_string()],
                    draft: LeadDraft {
                        summary: "Sesiune cu imagine incarcata.".to_string(),
                        ..LeadDraft::default()
                    },
                },
            );
        }
        self.write_store(&store).await
    }
}

/// Pure aggregation over leads created today (UTC date prefix), top-3
/// by frequency for each draft dimension.
pub fn compute_daily_overview(leads: &[AssistantLead]) -> DailyOverview {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let today_leads: Vec<&AssistantLead> = leads
        .iter()
        .filter(|lead| lead.created_at.starts_with(&today))
        .collect();

    let mut by_type: HashMap<String, usize> = HashMap::new();
    let mut by_style: HashMap<String, usize> = HashMap::new();
    let mut by_dimensions: HashMap<String, usize> = HashMap::new();

    for lead in &today_leads {
        if !lead.draft.project_type.is_empty() {
            *by_type.entry(lead.draft.project_type.clone()).or_default() += 1;
        }
        if !lead.draft.style.is_empty() {
            *by_style.entry(lead.draft.style.clone()).or_default() += 1;
        }
        if !lead.draft.dimensions.is_empty() {
            *by_dimensions.entry(lead.draft.dimensions.clone()).or_default() += 1;
        }
    }

    DailyOverview {
        today,
        total_today_leads: today_leads.len(),
        top_types: top_entries(by_type),
        top_styles: top_entries(by_style),
        top_dimensions: top_entries(by_dimensions),
    }
}

fn top_entries(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(3);
    entries
}

/// Pull a transcript tail for notification emails and logs.
pub fn transcript_tail(transcript: &[ChatMessage], turns: usize) -> &[ChatMessage] {
    let start = transcript.len().saturating_sub(turns);
    &transcript[start..]
}
