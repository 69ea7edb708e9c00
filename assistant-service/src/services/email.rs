//! Lead notification email to the artist.
//!
//! Sending is best-effort: a forwarded lead is already persisted by the
//! time the email goes out, so delivery failures are logged and never
//! surfaced to the visitor.

use crate::config::SmtpConfig;
use crate::models::chat::ChatRole;
use crate::models::lead::AssistantLead;
use crate::services::store::transcript_tail;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

const TRANSCRIPT_TAIL_TURNS: usize = 10;

pub struct LeadMailer {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl LeadMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, anyhow::Error> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(config.user.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| anyhow::anyhow!("Failed to create SMTP relay: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }

    /// Best-effort notification; logs and swallows every failure.
    pub async fn send_lead_notification(&self, lead: &AssistantLead) {
        if !self.config.enabled {
            tracing::info!(
                request_id = %lead.request_id,
                "SMTP disabled, skipping lead notification"
            );
            return;
        }

        let Some(transport) = self.transport.as_ref() else {
            tracing::warn!("SMTP transport not initialized, skipping lead notification");
            return;
        };

        let message = match self.build_message(lead) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(request_id = %lead.request_id, error = %e, "Failed to build lead notification");
                return;
            }
        };

        match transport.send(message).await {
            Ok(_) => {
                tracing::info!(
                    request_id = %lead.request_id,
                    to = %self.config.notify_email,
                    "Lead notification sent"
                );
            }
            Err(e) => {
                tracing::error!(request_id = %lead.request_id, error = %e, "Failed to send lead notification");
            }
        }
    }

    fn build_message(&self, lead: &AssistantLead) -> Result<Message, anyhow::Error> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid from address: {e}"))?;
        let to: Mailbox = self
            .config
            .notify_email
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid notify address: {e}"))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(format!("Cerere noua din chat: {}", lead.request_id))
            .header(ContentType::TEXT_PLAIN)
            .body(build_notification_body(lead))
            .map_err(|e| anyhow::anyhow!("Failed to build message: {e}"))
    }
}

fn build_notification_body(lead: &AssistantLead) -> String {
    let mut body = String::new();
    body.push_str(&format!("Numar solicitare: {}\n", lead.request_id));
    body.push_str(&format!("Pagina: {}\n", lead.page));
    body.push_str(&format!(
        "Contact ({:?}): {}\n",
        lead.contact_type, lead.contact_value
    ));
    body.push_str(&format!("Rezumat: {}\n", lead.draft.summary));
    if !lead.image_urls.is_empty() {
        body.push_str(&format!("Imagini: {}\n", lead.image_urls.join(", ")));
    }

    body.push_str("\nUltimele mesaje:\n");
    for message in transcript_tail(&lead.transcript, TRANSCRIPT_TAIL_TURNS) {
        let who = match message.role {
            ChatRole::User => "Client",
            ChatRole::Assistant => "Asistent",
        };
        body.push_str(&format!("- {who}: {}\n", message.content));
    }
    body
}
