use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub openai: OpenAiConfig,
    pub smtp: SmtpConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Empty key means the assistant is not configured; chat turns
    /// answer with 503 until it is set.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    /// Recipient for forwarded-lead notifications.
    pub notify_email: String,
    pub enabled: bool,
}

/// Storage backend selection, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    /// Base directory for the local backend (store file + uploads).
    pub data_dir: String,
    /// Bucket for the S3 backend; ignored for local.
    pub bucket: String,
}

impl AssistantConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        let backend = match core_config::get_env("STORAGE_BACKEND", Some("local"), is_prod)?
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackendKind::S3,
            _ => StorageBackendKind::Local,
        };

        Ok(AssistantConfig {
            common,
            openai: OpenAiConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                model: core_config::get_env("AI_MODEL", Some("gpt-4.1-mini"), false)?,
                base_url: core_config::get_env(
                    "OPENAI_API_BASE",
                    Some("https://api.openai.com/v1"),
                    false,
                )?,
            },
            smtp: SmtpConfig {
                host: core_config::get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: core_config::get_env("SMTP_PORT", Some("587"), is_prod)?
                    .parse()
                    .unwrap_or(587),
                user: core_config::get_env("SMTP_USER", Some(""), is_prod)?,
                password: core_config::get_env("SMTP_PASSWORD", Some(""), is_prod)?,
                from_email: core_config::get_env(
                    "SMTP_FROM_EMAIL",
                    Some("noreply@example.com"),
                    is_prod,
                )?,
                from_name: core_config::get_env(
                    "SMTP_FROM_NAME",
                    Some("Atelier Assistant"),
                    is_prod,
                )?,
                notify_email: core_config::get_env(
                    "LEAD_NOTIFY_EMAIL",
                    Some(crate::services::knowledge::ARTIST_EMAIL),
                    is_prod,
                )?,
                enabled: env::var("SMTP_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            storage: StorageConfig {
                backend,
                data_dir: core_config::get_env("STORAGE_DATA_DIR", Some("./.data"), false)?,
                bucket: core_config::get_env("STORAGE_BUCKET", Some(""), is_prod)?,
            },
        })
    }
}
