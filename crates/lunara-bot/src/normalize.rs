// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input normalization and greeting detection.
//!
//! The normalized token is used exclusively for command and menu matching.
//! Content capture (symptom text, feedback, dates, language names) always
//! works on the trimmed raw text instead.

use std::sync::LazyLock;

use regex::Regex;

static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(hi|hello|hey|yo|good\s*(morning|afternoon|evening))")
        .expect("greeting regex is valid")
});

/// Derive the canonical matching token from raw message text: trim,
/// lowercase, and strip every character outside `[a-z0-9]`.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Whether the raw text opens with a greeting ("hi", "hello", "good
/// morning", ...). Greetings reset the conversation to the menu from any
/// state.
pub fn is_greeting(raw: &str) -> bool {
    GREETING_RE.is_match(raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_lowercases_and_strips() {
        assert_eq!(normalize("  Track My Period! "), "trackmyperiod");
        assert_eq!(normalize("1."), "1");
        assert_eq!(normalize("2)"), "2");
        assert_eq!(normalize("DONE"), "done");
        assert_eq!(normalize("yes, please"), "yesplease");
    }

    #[test]
    fn empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("?!\u{1F600}"), "");
    }

    #[test]
    fn non_ascii_letters_are_stripped() {
        // Lowercasing happens before the ascii filter, so accented and
        // non-latin characters disappear rather than slipping through.
        assert_eq!(normalize("Zaɓi 3"), "zai3");
        assert_eq!(normalize("ÉDUCATION"), "ducation");
    }

    #[test]
    fn greetings_match_from_the_start_only() {
        assert!(is_greeting("hi"));
        assert!(is_greeting("Hello there"));
        assert!(is_greeting("HEY!"));
        assert!(is_greeting("yo"));
        assert!(is_greeting("good morning"));
        assert!(is_greeting("Goodevening"));
        assert!(!is_greeting("oh hi"));
        assert!(!is_greeting("goodbye"));
        assert!(!is_greeting("12/05/2025"));
    }

    proptest! {
        #[test]
        fn normalize_is_total_and_ascii_lower(input in ".*") {
            let out = normalize(&input);
            prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        #[test]
        fn normalize_is_idempotent(input in ".*") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
