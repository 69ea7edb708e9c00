//! Customer-intake assistant for the atelier site.
//!
//! The service ingests chat transcripts from the site widget, extracts
//! structured lead signals, decides when a conversation is worth
//! capturing as a lead, and records sessions and forwarded leads in a
//! JSON document store. Replies produced by the language model pass
//! through a deterministic policy filter before reaching the visitor.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
