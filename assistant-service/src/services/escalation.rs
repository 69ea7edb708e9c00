//! The escalation ladder: which canned nudge, if any, answers a turn
//! before the model is even called.
//!
//! Rule order encodes a product decision that favors fast lead capture
//! over long conversations. Keep it ordered; first match wins.

use crate::models::chat::{ChatMessage, latest_user_message};
use crate::models::lead::LeadStatus;
use crate::services::knowledge::{ARTIST_EMAIL, ARTIST_PHONE};
use crate::services::signals;
use once_cell::sync::Lazy;
use regex::Regex;

static REQUEST_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([MGA])-(\d{4})\b").expect("pattern is valid"));

/// How a chat turn is answered, decided before any model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRoute {
    /// The latest user message carries a request id; answer with the
    /// lead's status and bypass everything else.
    StatusLookup { request_id: String },
    /// A rule fired: answer with its canned reply, skip the model.
    Canned { reply: String, lead_ready: bool },
    /// Fall through to the model; `lead_ready` still rides along.
    Model { lead_ready: bool },
}

/// Evaluate the ladder over a normalized transcript.
pub fn route_turn(messages: &[ChatMessage]) -> TurnRoute {
    // 1. Status lookup outranks every readiness rule.
    if let Some(request_id) = extract_request_id(messages) {
        return TurnRoute::StatusLookup { request_id };
    }

    let user_turns = signals::user_message_count(messages);
    let info_count = signals::lead_info_count(messages);

    // 2/3. Explicit wish to reach a human.
    if signals::is_human_handoff_intent(messages) {
        if info_count >= 2 {
            return TurnRoute::Canned {
                reply: handoff_offer(),
                lead_ready: true,
            };
        }
        return TurnRoute::Canned {
            reply: handoff_needs_details(),
            lead_ready: false,
        };
    }

    // 5. The visitor keeps answering "nu stiu": offer direct contact.
    if signals::count_uncertain_replies(messages) >= 2 && user_turns >= 3 {
        return TurnRoute::Canned {
            reply: uncertain_direct_contact(),
            lead_ready: true,
        };
    }

    // 6. Stalling or low progress: stop asking, hand out the contact.
    let stalled = signals::count_assistant_questions(messages) >= 3 && user_turns >= 3;
    let low_progress = user_turns >= 6 && info_count <= 1;
    if stalled || low_progress {
        return TurnRoute::Canned {
            reply: low_progress_reminder(),
            lead_ready: true,
        };
    }

    // 4. Proactive capture after two user turns; 7. otherwise strict.
    TurnRoute::Model {
        lead_ready: signals::is_lead_ready(messages) || user_turns >= 2,
    }
}

/// Request-id pattern in the most recent user message, uppercased.
pub fn extract_request_id(messages: &[ChatMessage]) -> Option<String> {
    let latest = latest_user_message(messages)?;
    REQUEST_ID_PATTERN
        .find(&latest.content)
        .map(|m| m.as_str().to_uppercase())
}

fn handoff_offer() -> String {
    "Pot trimite mai departe ce am discutat, ca sa nu repeti detaliile. Preferi email sau telefon?"
        .to_string()
}

fn handoff_needs_details() -> String {
    "Te pun cu drag in legatura directa. Inainte, spune-mi 1-2 detalii (de exemplu dimensiunea \
     aproximativa si unde va sta piesa), ca mesajul trimis sa fie cat mai util."
        .to_string()
}

fn uncertain_direct_contact() -> String {
    format!(
        "Nicio problema daca nu stii inca toate detaliile. Cel mai simplu este sa vorbesti direct \
         cu Marcel: {ARTIST_EMAIL} sau {ARTIST_PHONE}. Pot si sa trimit mai departe ce am discutat \
         pana acum."
    )
}

fn low_progress_reminder() -> String {
    format!(
        "Ca sa nu pierdem timp cu intrebari, iti las contactul direct: {ARTIST_EMAIL} / \
         {ARTIST_PHONE}. Daca vrei, trimit mai departe rezumatul discutiei."
    )
}

/// Canned status replies, one per workflow state.
pub fn status_reply(request_id: &str, status: Option<LeadStatus>) -> String {
    match status {
        Some(LeadStatus::New) => format!(
            "Cererea {request_id} a fost primita si urmeaza sa fie analizata. De obicei revenim \
             in 24-48 de ore."
        ),
        Some(LeadStatus::Seen) => format!("Cererea {request_id} este in curs de analiza."),
        Some(LeadStatus::InProgress) => {
            format!("Pentru cererea {request_id} se pregateste o propunere.")
        }
        Some(LeadStatus::Replied) => format!(
            "La cererea {request_id} s-a raspuns deja. Verifica emailul sau mesajele."
        ),
        Some(LeadStatus::Closed) => format!(
            "Cererea {request_id} este inchisa. Daca ai detalii noi, o putem redeschide."
        ),
        None => format!(
            "Nu gasesc cererea {request_id}. Verifica formatul (de exemplu M-1234) sau scrie-mi \
             din nou numarul."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ChatMessage, ChatRole};

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

    #[test]
    fn status_lookup_outranks_everything() {
        // Handoff keywords and a request id in the same message: the id wins.
        let messages = vec![
            user("Vreau un cadou minimalist 50x70 pentru living"),
            user("vreau sa vorbesc direct, care e statusul pentru m-4821?"),
        ];
        assert_eq!(
            route_turn(&messages),
            TurnRoute::StatusLookup {
                request_id: "M-4821".to_string()
            }
        );
    }

    #[test]
    fn handoff_with_enough_details_offers_forwarding() {
        let messages = vec![
            user("Vreau un vitraliu floral pentru baie"),
            user("prefer sa vorbesc cu o persoana"),
        ];
        let route = route_turn(&messages);
        match route {
            TurnRoute::Canned { reply, lead_ready } => {
                assert!(lead_ready);
                assert!(reply.contains("email sau telefon"));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn handoff_without_details_asks_for_them() {
        let messages = vec![user("vreau sa vorbesc cu un om")];
        let route = route_turn(&messages);
        match route {
            TurnRoute::Canned { reply, lead_ready } => {
                assert!(!lead_ready);
                assert!(reply.contains("1-2 detalii"));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn two_user_turns_escalate_without_canned_reply() {
        let messages = vec![
            user("ce tehnici folositi?"),
            assistant("Sablare si vitraliu."),
            user("interesant, povesteste-mi mai mult"),
        ];
        assert_eq!(route_turn(&messages), TurnRoute::Model { lead_ready: true });
    }

    #[test]
    fn single_turn_stays_with_the_model() {
        let messages = vec![user("ce tehnici folositi?")];
        assert_eq!(route_turn(&messages), TurnRoute::Model { lead_ready: false });
    }

    #[test]
    fn repeated_uncertainty_offers_direct_contact() {
        let messages = vec![
            user("caut ceva dar nu stiu exact ce"),
            user("nu sunt sigur de dimensiuni"),
            user("nu conteaza stilul"),
        ];
        let route = route_turn(&messages);
        match route {
            TurnRoute::Canned { reply, lead_ready } => {
                assert!(lead_ready);
                assert!(reply.contains(ARTIST_EMAIL));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn six_turns_with_one_field_fires_low_progress() {
        let mut messages = Vec::new();
        for i in 0..6 {
            messages.push(user(&format!("inca ma gandesc, revin {i}")));
        }
        messages.push(user("as pune ceva in living"));
        let route = route_turn(&messages);
        match route {
            TurnRoute::Canned { reply, lead_ready } => {
                assert!(lead_ready);
                assert!(reply.contains(ARTIST_PHONE));
            }
            other => panic!("unexpected route: {other:?}"),
        }
    }

    #[test]
    fn three_assistant_questions_fire_the_stall_rule() {
        let messages = vec![
            user("salut"),
            assistant("Unde va sta piesa?"),
            user("inca nu m-am hotarat"),
            assistant("Ce dimensiune are locul? Ce stil preferi?"),
            user("ma mai gandesc"),
        ];
        let route = route_turn(&messages);
        assert!(matches!(route, TurnRoute::Canned { lead_ready: true, .. }));
    }

    #[test]
    fn request_id_matches_case_insensitively() {
        assert_eq!(
            extract_request_id(&[user("status g-1234 va rog")]),
            Some("G-1234".to_string())
        );
        assert_eq!(extract_request_id(&[user("status X-1234")]), None);
        assert_eq!(extract_request_id(&[user("status M-123")]), None);
    }

    #[test]
    fn unknown_lead_status_reply_mentions_the_format() {
        let reply = status_reply("M-4821", None);
        assert!(reply.contains("Nu gasesc cererea M-4821"));
        assert!(reply.contains("formatul"));
    }
}
