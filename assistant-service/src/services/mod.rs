pub mod assistant;
pub mod email;
pub mod escalation;
pub mod knowledge;
pub mod providers;
pub mod reply_policy;
pub mod request_id;
pub mod signals;
pub mod store;
pub mod uploads;
