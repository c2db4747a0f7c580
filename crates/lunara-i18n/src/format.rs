// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Positional placeholder substitution for message templates.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder regex is valid"));

/// Substitute `{0}`, `{1}`, ... placeholders with positional arguments.
///
/// An index with no matching argument is left as the literal placeholder
/// text. Never fails.
pub fn fill(template: &str, args: &[&str]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| args.get(i).copied())
                .unwrap_or(&caps[0])
                .to_string()
        })
        .into_owned()
}
