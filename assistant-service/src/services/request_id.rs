//! Human-speakable request identifiers.

use rand::Rng;

/// Build a request id of the form `{PREFIX}-{4 digits}`.
///
/// The prefix is a coarse project-type namespace: G for gifts, A for
/// art/decorative pieces, M as the generic default. The suffix is four
/// random digits with no uniqueness check; callers tolerate the small
/// collision risk.
pub fn build_request_id(project_type: &str) -> String {
    let normalized = project_type.to_lowercase();
    let prefix = if normalized.contains("cadou") {
        'G'
    } else if normalized.contains("arta") || normalized.contains("decorativ") {
        'A'
    } else {
        'M'
    };
    let digits = rand::thread_rng().gen_range(1000..=9999);
    format!("{prefix}-{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use regex::Regex;

    static ID_FORMAT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[MGA]-\d{4}$").expect("pattern is valid"));

    #[test]
    fn ids_always_match_the_format() {
        for project_type in ["", "cadou personalizat", "obiect decorativ", "vitraliu"] {
            for _ in 0..50 {
                let id = build_request_id(project_type);
                assert!(ID_FORMAT.is_match(&id), "{id}");
            }
        }
    }

    #[test]
    fn prefix_follows_project_type() {
        assert!(build_request_id("cadou personalizat").starts_with("G-"));
        assert!(build_request_id("obiect decorativ").starts_with("A-"));
        assert!(build_request_id("arta in sticla").starts_with("A-"));
        assert!(build_request_id("vitraliu").starts_with("M-"));
        assert!(build_request_id("").starts_with("M-"));
    }

    #[test]
    fn suffix_stays_in_range() {
        for _ in 0..200 {
            let id = build_request_id("sablare");
            let digits: u32 = id[2..].parse().expect("four digits");
            assert!((1000..=9999).contains(&digits));
        }
    }
}
