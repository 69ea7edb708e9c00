//! Conversation orchestration: one chat turn and one lead forward.
//!
//! A turn runs normalize -> draft -> route -> session upsert -> reply,
//! in that order; the session snapshot is saved before the reply is
//! produced so a failed model call still leaves the turn recorded.

use crate::models::chat::{
    latest_user_message, normalize_messages, ChatMessage, CHAT_CONTENT_CAP, CHAT_HISTORY_CAP,
    FORWARD_CONTENT_CAP, FORWARD_HISTORY_CAP,
};
use crate::models::lead::{AssistantLead, ContactType, LeadStatus};
use crate::models::session::SessionUpsert;
use crate::services::email::LeadMailer;
use crate::services::escalation::{self, TurnRoute};
use crate::services::knowledge;
use crate::services::providers::{ChatProvider, ProviderError};
use crate::services::reply_policy::enforce_assistant_policy;
use crate::services::request_id::build_request_id;
use crate::services::signals::{self, LeadDraft};
use crate::services::store::LeadStore;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use service_core::error::AppError;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("pattern is valid"));
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+\d][\d\s()-]{7,}$").expect("pattern is valid"));

const MODEL_UNAVAILABLE_REPLY: &str = "Asistentul este momentan indisponibil. Incearca din nou.";
const NOT_CONFIGURED_REPLY: &str = "Asistentul nu este configurat momentan. Incearca mai tarziu.";

pub struct TurnOutcome {
    pub reply: String,
    pub lead_ready: bool,
    pub lead_draft: LeadDraft,
}

pub struct ForwardInput {
    pub page: String,
    pub messages: Vec<ChatMessage>,
    pub session_id: String,
    pub contact_type: String,
    pub contact_value: String,
}

pub struct ForwardOutcome {
    pub request_id: String,
    pub confirmation: String,
}

pub async fn handle_turn(
    store: &LeadStore,
    provider: &dyn ChatProvider,
    page: &str,
    messages: &[ChatMessage],
    session_id: &str,
) -> Result<TurnOutcome, AppError> {
    let normalized = normalize_messages(messages, CHAT_CONTENT_CAP, CHAT_HISTORY_CAP);
    let Some(latest) = latest_user_message(&normalized) else {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Trimite o intrebare pentru a primi raspuns."
        )));
    };
    let latest = latest.content.clone();

    if !provider.is_configured() {
        return Err(AppError::ServiceUnavailable(NOT_CONFIGURED_REPLY.to_string()));
    }

    let draft = signals::build_lead_draft(&normalized);
    let route = escalation::route_turn(&normalized);
    let lead_ready = match &route {
        // A status question is not a lead signal in either direction;
        // the session keeps whatever readiness it already reached.
        TurnRoute::StatusLookup { .. } => store
            .get_session(session_id)
            .await?
            .map(|s| s.lead_ready)
            .unwrap_or(false),
        TurnRoute::Canned { lead_ready, .. } | TurnRoute::Model { lead_ready } => *lead_ready,
    };

    // Record the turn before producing the reply.
    store
        .upsert_session(SessionUpsert {
            session_id: session_id.to_string(),
            page: page.to_string(),
            message_count: signals::user_message_count(&normalized),
            last_user_message: latest,
            lead_ready,
            draft: draft.clone(),
        })
        .await?;

    let reply = match route {
        TurnRoute::StatusLookup { request_id } => {
            let lead = store.get_lead_by_request_id(&request_id).await?;
            escalation::status_reply(&request_id, lead.map(|l| l.status))
        }
        TurnRoute::Canned { reply, .. } => reply,
        TurnRoute::Model { .. } => {
            let system_prompt = knowledge::build_system_prompt(page);
            let raw = provider
                .complete(&system_prompt, &normalized)
                .await
                .map_err(map_provider_error)?;
            enforce_assistant_policy(&raw)
        }
    };

    Ok(TurnOutcome {
        reply,
        lead_ready,
        lead_draft: draft,
    })
}

fn map_provider_error(e: ProviderError) -> AppError {
    match e {
        ProviderError::NotConfigured(_) => {
            AppError::ServiceUnavailable(NOT_CONFIGURED_REPLY.to_string())
        }
        ProviderError::EmptyReply => {
            AppError::InternalError(anyhow::anyhow!("model returned an empty reply"))
        }
        ProviderError::ApiError(_) | ProviderError::NetworkError(_) => {
            tracing::error!(error = %e, "Model call failed");
            AppError::BadGateway(MODEL_UNAVAILABLE_REPLY.to_string())
        }
    }
}

pub async fn forward_lead(
    store: &LeadStore,
    mailer: &LeadMailer,
    input: ForwardInput,
) -> Result<ForwardOutcome, AppError> {
    let normalized = normalize_messages(&input.messages, FORWARD_CONTENT_CAP, FORWARD_HISTORY_CAP);
    if normalized.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Conversatia este goala, nu am ce trimite."
        )));
    }

    let contact_type = match input.contact_type.trim().to_lowercase().as_str() {
        "email" => ContactType::Email,
        "phone" => ContactType::Phone,
        _ => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Alege e-mail sau telefon pentru contact."
            )));
        }
    };
    let contact_value = input.contact_value.trim().to_string();
    match contact_type {
        ContactType::Email if !EMAIL_REGEX.is_match(&contact_value) => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Adauga o adresa de e-mail valida."
            )));
        }
        ContactType::Phone if !PHONE_REGEX.is_match(&contact_value) => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Adauga un numar de telefon valid."
            )));
        }
        _ => {}
    }

    let session = store.get_session(&input.session_id).await?;
    if session.as_ref().is_some_and(|s| s.forwarded) {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Cererea pentru aceasta sesiune a fost deja trimisa."
        )));
    }
    let image_urls = session.map(|s| s.image_urls).unwrap_or_default();

    let draft = signals::build_lead_draft(&normalized);
    let request_id = build_request_id(&draft.project_type);

    // Forward can arrive without a prior chat turn on this session;
    // upsert first so the forwarded mark always lands on a record.
    store
        .upsert_session(SessionUpsert {
            session_id: input.session_id.clone(),
            page: input.page.clone(),
            message_count: signals::user_message_count(&normalized),
            last_user_message: latest_user_message(&normalized)
                .map(|m| m.content.clone())
                .unwrap_or_default(),
            lead_ready: true,
            draft: draft.clone(),
        })
        .await?;

    let lead = AssistantLead {
        request_id: request_id.clone(),
        created_at: Utc::now().to_rfc3339(),
        page: input.page,
        status: LeadStatus::New,
        session_id: input.session_id.clone(),
        image_urls,
        contact_type,
        contact_value,
        transcript: normalized,
        draft,
    };

    let lead = store.create_lead(lead).await?;
    store
        .mark_session_forwarded(&input.session_id, &request_id)
        .await?;

    // Best-effort; the lead is already durable.
    mailer.send_lead_notification(&lead).await;

    let confirmation = format!(
        "Multumesc! Am trimis cererea. Numar solicitare: {request_id}. Revenim de obicei in \
         24-48 de ore. Daca vrei sa verifici mai tarziu, imi poti scrie: Status {request_id}"
    );

    Ok(ForwardOutcome {
        request_id,
        confirmation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;
    use crate::models::chat::ChatRole;
    use crate::services::providers::MockChatProvider;
    use crate::services::store::{LocalFileBackend, StoreBackend};
    use std::sync::Arc;

    fn user(content: &str) -> ChatMessage {
        ChatMessage {
            role: ChatRole::User,
            content: content.to_string(),
        }
    }

    fn assistant(content: &str) -> ChatMessage {
        ChatMessage {
            role: ChatRole::Assistant,
            content: content.to_string(),
        }
    }

    async fn test_store() -> LeadStore {
        let dir = std::env::temp_dir().join(format!("assistant-orch-{}", uuid::Uuid::new_v4()));
        let backend: Arc<dyn StoreBackend> =
            Arc::new(LocalFileBackend::new(&dir).await.unwrap());
        LeadStore::new(backend)
    }

    fn disabled_mailer() -> LeadMailer {
        LeadMailer::new(SmtpConfig {
            host: String::new(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Atelier".to_string(),
            notify_email: "artist@example.com".to_string(),
            enabled: false,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn turn_without_user_message_is_rejected() {
        let store = test_store().await;
        let provider = MockChatProvider::new(true);
        let result = handle_turn(&store, &provider, "/", &[assistant("Buna!")], "s-1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn unconfigured_provider_yields_service_unavailable() {
        let store = test_store().await;
        let provider = MockChatProvider::new(false);
        let result = handle_turn(&store, &provider, "/", &[user("Buna")], "s-1").await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn model_turn_records_the_session_and_enforces_policy() {
        let store = test_store().await;
        let provider =
            MockChatProvider::with_reply("Ce stil preferi? Si ce dimensiuni are geamul?");
        let messages = vec![
            user("Vreau un vitraliu pentru living"),
            assistant("Sigur!"),
            user("Ceva modern, 50x70"),
        ];

        let outcome = handle_turn(&store, &provider, "/galerie", &messages, "s-1")
            .await
            .unwrap();

        // Two questions collapse to one.
        assert_eq!(outcome.reply.matches('?').count(), 1);
        assert!(outcome.lead_ready);
        assert_eq!(outcome.lead_draft.project_type, "vitraliu");

        let session = store.get_session("s-1").await.unwrap().expect("session saved");
        assert_eq!(session.message_count, 2);
        assert!(session.lead_ready);
        assert_eq!(session.page, "/galerie");
    }

    #[tokio::test]
    async fn status_turn_answers_from_the_store_without_readiness() {
        let store = test_store().await;
        let provider = MockChatProvider::new(true);

        let outcome = handle_turn(&store, &provider, "/", &[user("Status M-4821")], "s-2")
            .await
            .unwrap();
        assert!(outcome.reply.contains("Nu gasesc cererea M-4821"));
        assert!(!outcome.lead_ready);

        let session = store.get_session("s-2").await.unwrap().expect("session saved");
        assert!(!session.lead_ready);
    }

    #[tokio::test]
    async fn status_turn_keeps_the_sessions_readiness() {
        let store = test_store().await;
        let provider = MockChatProvider::new(true);

        let messages = vec![
            user("Vreau un vitraliu modern pentru living"),
            assistant("Sigur, ce dimensiuni?"),
            user("Cam 50x70"),
        ];
        let outcome = handle_turn(&store, &provider, "/", &messages, "s-5")
            .await
            .unwrap();
        assert!(outcome.lead_ready);

        // Asking for a status afterwards must not regress the session.
        let outcome = handle_turn(&store, &provider, "/", &[user("Status M-4821")], "s-5")
            .await
            .unwrap();
        assert!(outcome.lead_ready);

        let session = store.get_session("s-5").await.unwrap().expect("session exists");
        assert!(session.lead_ready);
    }

    #[tokio::test]
    async fn forward_validates_contact_details() {
        let store = test_store().await;
        let mailer = disabled_mailer();

        let bad_email = forward_lead(
            &store,
            &mailer,
            ForwardInput {
                page: "/".to_string(),
                messages: vec![user("Vreau un vitraliu")],
                session_id: "s-3".to_string(),
                contact_type: "email".to_string(),
                contact_value: "not-an-email".to_string(),
            },
        )
        .await;
        assert!(matches!(bad_email, Err(AppError::BadRequest(_))));

        let bad_type = forward_lead(
            &store,
            &mailer,
            ForwardInput {
                page: "/".to_string(),
                messages: vec![user("Vreau un vitraliu")],
                session_id: "s-3".to_string(),
                contact_type: "pigeon".to_string(),
                contact_value: "coo".to_string(),
            },
        )
        .await;
        assert!(matches!(bad_type, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn forward_persists_the_lead_and_marks_the_session() {
        let store = test_store().await;
        let mailer = disabled_mailer();
        let provider = MockChatProvider::new(true);

        let messages = vec![
            user("Vreau un cadou minimalist 50x70 pentru living"),
            assistant("Sigur, pot inregistra o cerere."),
            user("Da, te rog"),
        ];
        handle_turn(&store, &provider, "/galerie", &messages, "s-4")
            .await
            .unwrap();

        let outcome = forward_lead(
            &store,
            &mailer,
            ForwardInput {
                page: "/galerie".to_string(),
                messages: messages.clone(),
                session_id: "s-4".to_string(),
                contact_type: "email".to_string(),
                contact_value: "client@example.com".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(outcome.request_id.starts_with("G-"));
        assert!(outcome.confirmation.contains(&outcome.request_id));

        let lead = store
            .get_lead_by_request_id(&outcome.request_id)
            .await
            .unwrap()
            .expect("lead persisted");
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.draft.project_type, "cadou personalizat");

        let session = store.get_session("s-4").await.unwrap().expect("session exists");
        assert!(session.forwarded);
        assert_eq!(session.request_id.as_deref(), Some(outcome.request_id.as_str()));

        // A second forward for the same session is refused.
        let again = forward_lead(
            &store,
            &mailer,
            ForwardInput {
                page: "/galerie".to_string(),
                messages,
                session_id: "s-4".to_string(),
                contact_type: "phone".to_string(),
                contact_value: "+40 721 000 000".to_string(),
            },
        )
        .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }
}
