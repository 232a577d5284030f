//! Slug derivation for URL-facing records.
//!
//! # Responsibility
//! - Turn human-readable titles into lowercase, hyphenated identifiers.
//! - Transliterate non-ASCII text first, so accented and non-Latin titles
//!   keep their letters.
//!
//! # Invariants
//! - Output contains only `[a-z0-9-]`, never starts or ends with `-` and
//!   never contains `--`.
//! - Derivation is total: empty or symbol-only input yields an empty slug.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Derives a URL-safe slug from `title`.
///
/// `"Hello World!"` becomes `"hello-world"`, `"Café Night"` becomes
/// `"cafe-night"`.
pub fn derive_slug(title: &str) -> String {
    let lowered = deunicode(title).to_lowercase();
    let hyphenated = NON_SLUG_RE.replace_all(&lowered, "-");
    hyphenated.trim_matches('-').to_string()
}

/// Returns `current` when it is set, otherwise the slug derived from `title`.
///
/// Used by entity constructors so a caller-supplied slug is never replaced.
pub fn slug_or_derive(current: Option<String>, title: &str) -> String {
    match current {
        Some(slug) if !slug.trim().is_empty() => slug,
        _ => derive_slug(title),
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_slug, slug_or_derive};

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        assert_eq!(derive_slug("Hello World!"), "hello-world");
        assert_eq!(derive_slug("  Code of   Conduct  "), "code-of-conduct");
        assert_eq!(derive_slug("PyGotham 2016: Call_for_Papers"), "pygotham-2016-call-for-papers");
    }

    #[test]
    fn derive_slug_of_empty_or_symbol_title_is_empty() {
        assert_eq!(derive_slug(""), "");
        assert_eq!(derive_slug("!!! ???"), "");
    }

    #[test]
    fn non_ascii_letters_are_transliterated() {
        assert_eq!(derive_slug("Café Night"), "cafe-night");
        assert_eq!(derive_slug("Über Python"), "uber-python");
    }

    #[test]
    fn non_latin_title_derives_non_empty_slug() {
        let slug = derive_slug("北京");
        assert!(!slug.is_empty());
        assert!(slug
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-'));
    }

    #[test]
    fn preset_slug_is_kept() {
        assert_eq!(slug_or_derive(Some("custom".to_string()), "Hello World!"), "custom");
        assert_eq!(slug_or_derive(None, "Hello World!"), "hello-world");
        assert_eq!(slug_or_derive(Some(String::new()), "Hello World!"), "hello-world");
    }
}
