//! Post-processing of model replies.
//!
//! The model is not trusted to self-limit: replies promising to send
//! files or emails are replaced wholesale, softer promise phrasing is
//! rewritten, and a reply never carries more than one question. All of
//! it is deterministic text surgery; this function cannot fail.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement text for the hard-veto path.
pub const SEND_PROMISE_REDIRECT: &str = "Nu pot trimite fisiere sau modele de aici. Cel mai \
    sigur este sa lasi o cerere cu datele tale de contact, iar Marcel revine cu propuneri \
    concrete. Ma ocup eu de restul.";

// A first-person send-promise near a deliverable object vetoes the
// whole reply. Second-person forms ("poti sa-mi trimiti o poza?") do
// not match: the leading modal and the verb form are both first-person.
static SEND_PROMISE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(pot|o sa|am sa|voi|iti|îti)\b([- ]?(sa|iti|îti|ti|va|vă|voi|o|am))*[- ]?\btrimit(e|em)?\b[^.!]*\b(e-?mail|mail|model(e|ul)?|exemple?|schit[ae]|poz[ae](le)?|fisier(e|ul)?|fișier)\b",
    )
    .expect("veto pattern is valid")
});

static SOFT_REWRITES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)\b(o sa iti trimit|iti voi trimite|o sa trimit|pot sa trimit)\b")
                .expect("rewrite pattern is valid"),
            "pot inregistra",
        ),
        (
            Regex::new(r"(?i)vrei sa (le|il|o) primesti pe e-?mail\?")
                .expect("rewrite pattern is valid"),
            "vrei sa inregistrez o cerere?",
        ),
        (
            Regex::new(r"(?i)\biti pot (da|face) un pret (exact|fix|ferm)\b")
                .expect("rewrite pattern is valid"),
            "pretul final depinde de dimensiune si complexitate",
        ),
    ]
});

/// Apply the output policy to a raw model reply.
///
/// Veto runs first and short-circuits: a vetoed reply is never also run
/// through the soft rewrites or the question cap.
pub fn enforce_assistant_policy(raw_reply: &str) -> String {
    let reply = raw_reply.trim();

    if SEND_PROMISE_REGEX.is_match(reply) {
        return SEND_PROMISE_REDIRECT.to_string();
    }

    let mut rewritten = reply.to_string();
    for (pattern, replacement) in SOFT_REWRITES.iter() {
        rewritten = pattern.replace_all(&rewritten, *replacement).into_owned();
    }

    cap_to_one_question(&rewritten)
}

/// At most one question per reply: with two or more `?`, cut right
/// after the first one and drop the rest.
fn cap_to_one_question(text: &str) -> String {
    if text.matches('?').count() < 2 {
        return text.to_string();
    }
    let first = text.find('?').expect("count checked above");
    text[..=first].trim_end().to_string()
}
