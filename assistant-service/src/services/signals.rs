//! Signal extraction over chat transcripts.
//!
//! Everything here is keyword/regex matching on purpose: the behavior
//! stays deterministic and auditable without a model call. Tables are
//! ordered and the first matching entry wins.

use crate::models::chat::{ChatMessage, ChatRole, latest_user_message};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured signals extracted from a transcript at a point in time.
/// Empty string means "not detected". Recomputed from scratch on every
/// turn; there is no incremental merge across turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub project_type: String,
    pub dimensions: String,
    pub style: String,
    pub location: String,
    pub summary: String,
}

pub const FALLBACK_SUMMARY: &str = "Cerere discutata in chat, fara detalii complete.";

static TYPE_KEYWORDS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("decor geam", rx(r"\b(geam|fereastra|usa|panou)\b")),
        ("vitraliu", rx(r"\bvitrali")),
        ("sablare", rx(r"\bsablat|sablare\b")),
        ("cadou personalizat", rx(r"\bcadou\b")),
        ("obiect decorativ", rx(r"\bdecor|vaza|piesa\b")),
    ]
});

static STYLE_KEYWORDS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("minimalist", rx(r"\bminimal")),
        ("modern", rx(r"\bmodern")),
        ("clasic", rx(r"\bclasic")),
        ("floral", rx(r"\bfloral|floare\b")),
        ("abstract", rx(r"\babstract")),
    ]
});

static LOCATION_KEYWORDS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("living", rx(r"\bliving\b")),
        ("dormitor", rx(r"\bdormitor\b")),
        ("hol", rx(r"\bhol\b")),
        ("bucatarie", rx(r"\bbucatar")),
        ("baie", rx(r"\bbaie\b")),
        ("birou", rx(r"\bbirou\b")),
        ("spatiu comercial", rx(r"\bcomercial|cafenea|salon\b")),
    ]
});

static INTENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    rx(r"\b(vreau|as vrea|proiect|comanda|cat costa|pret|durata|termen|personalizat|pot sa fac)\b")
});

static HANDOFF_REGEX: Lazy<Regex> = Lazy::new(|| {
    rx(r"\b(vorbesc|vorbim|discut|discutam|om|persoana|operator|direct|sunat|contactat)\b")
});

static UNCERTAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    rx(r"\b(nu stiu|nu știu|nush|nu sunt sigur|nu sunt sigura|habar n-am|nu conteaza|nu contează)\b")
});

static DIMENSIONS_REGEX: Lazy<Regex> =
    Lazy::new(|| rx(r"\b\d{1,4}\s?(?:x|X|\*)\s?\d{1,4}(?:\s?(?:x|X|\*)\s?\d{1,4})?\b"));

fn rx(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("keyword pattern is valid")
}

fn user_text(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" \n ")
}

fn first_match(text: &str, rules: &[(&'static str, Regex)]) -> String {
    rules
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map(|(label, _)| (*label).to_string())
        .unwrap_or_default()
}

fn extract_dimensions(text: &str) -> String {
    DIMENSIONS_REGEX
        .find(text)
        .map(|m| m.as_str().replace(['*', 'X'], "x"))
        .unwrap_or_default()
}

/// Build the normalized draft record, summary line included. Pure and
/// idempotent: no clock reads, no randomness.
pub fn build_lead_draft(messages: &[ChatMessage]) -> LeadDraft {
    let text = user_text(messages);

    let project_type = first_match(&text, &TYPE_KEYWORDS);
    let style = first_match(&text, &STYLE_KEYWORDS);
    let location = first_match(&text, &LOCATION_KEYWORDS);
    let dimensions = extract_dimensions(&text);

    let parts: Vec<String> = [
        ("Tip", &project_type),
        ("Locatie", &location),
        ("Dimensiuni", &dimensions),
        ("Stil", &style),
    ]
    .iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect();

    let summary = if parts.is_empty() {
        FALLBACK_SUMMARY.to_string()
    } else {
        parts.join(" | ")
    };

    LeadDraft {
        project_type,
        location,
        dimensions,
        style,
        summary,
    }
}

pub fn user_message_count(messages: &[ChatMessage]) -> usize {
    messages.iter().filter(|m| m.role == ChatRole::User).count()
}

/// How many of the four draft fields were detected, 0..=4.
pub fn lead_info_count(messages: &[ChatMessage]) -> usize {
    let draft = build_lead_draft(messages);
    [
        &draft.project_type,
        &draft.location,
        &draft.dimensions,
        &draft.style,
    ]
    .iter()
    .filter(|field| !field.is_empty())
    .count()
}

pub fn has_project_intent(messages: &[ChatMessage]) -> bool {
    INTENT_REGEX.is_match(&user_text(messages))
}

/// Handoff intent looks only at the most recent user message, not the
/// whole history.
pub fn is_human_handoff_intent(messages: &[ChatMessage]) -> bool {
    latest_user_message(messages)
        .map(|m| HANDOFF_REGEX.is_match(&m.content))
        .unwrap_or(false)
}

pub fn count_uncertain_replies(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .filter(|m| m.role == ChatRole::User && UNCERTAIN_REGEX.is_match(&m.content))
        .count()
}

/// Total `?` characters across assistant messages; a coarse proxy for
/// how many clarifying questions have been asked so far.
pub fn count_assistant_questions(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .filter(|m| m.role == ChatRole::Assistant)
        .map(|m| m.content.matches('?').count())
        .sum()
}

/// The strict readiness signal: at least two user turns, explicit
/// purchase intent and at least two detected draft fields.
pub fn is_lead_ready(messages: &[ChatMessage]) -> bool {
    if user_message_count(messages) < 2 {
        return false;
    }
    has_project_intent(messages) && lead_info_count(messages) >= 2
}
