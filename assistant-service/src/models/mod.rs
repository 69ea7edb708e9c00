pub mod chat;
pub mod lead;
pub mod session;

pub use chat::{ChatMessage, ChatRole, latest_user_message, normalize_messages};
pub use lead::{AssistantLead, ContactType, LeadStatus};
pub use session::{AssistantSession, SessionUpsert};
