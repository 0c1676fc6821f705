//! Post slug normalization: lowercase, non-alphanumeric runs collapsed to a
//! single hyphen, leading/trailing hyphens trimmed. Idempotent.

use regex::Regex;
use std::sync::OnceLock;

fn non_alnum() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Derive a slug from free text. `"Hello, World!"` becomes `"hello-world"`.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let replaced = non_alnum().replace_all(&lowered, "-");
    replaced.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_title() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn collapses_whitespace_and_punctuation() {
        assert_eq!(slugify("The  Saga -- of   Ash & Ink"), "the-saga-of-ash-ink");
    }

    #[test]
    fn idempotent_on_normalized_input() {
        let once = slugify("Behind the Scenes: Issue #12");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn trims_edge_hyphens() {
        assert_eq!(slugify("  !!Spoilers!!  "), "spoilers");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(slugify("???"), "");
    }
}
