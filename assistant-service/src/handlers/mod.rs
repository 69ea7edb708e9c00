pub mod assistant;
pub mod forward;
pub mod health;
pub mod leads;
pub mod sessions;
pub mod upload;

pub use assistant::chat_turn;
pub use forward::forward_lead;
pub use health::{health_check, readiness_check};
pub use leads::{leads_overview, list_leads, update_lead_status};
pub use sessions::list_sessions;
pub use upload::{serve_upload, upload_image};
