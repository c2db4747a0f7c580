// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Period date parsing, prediction, and display formatting.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

/// Day/month/year with 1-2 digit day and month, 2-4 digit year, `/` or `-`
/// separators. Matched anywhere in the raw text, so "around 12/05/2025"
/// still parses.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})").expect("date regex is valid")
});

/// Outcome of parsing user-entered period date text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParse {
    /// Nothing in the text looks like a date at all.
    NoMatch,
    /// Matched the shape but is not a real calendar date (e.g. 31/02/2025).
    Invalid,
    Valid(NaiveDate),
}

/// Parse a `D/M/Y` date out of raw text.
///
/// Two-digit years are interpreted as 2000 + yy.
pub fn parse_period_date(raw: &str) -> DateParse {
    let Some(caps) = DATE_RE.captures(raw) else {
        return DateParse::NoMatch;
    };

    // The regex guarantees these are short digit runs; the parses cannot fail.
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let mut year: i32 = caps[3].parse().unwrap_or(0);
    if year < 100 {
        year += 2000;
    }

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => DateParse::Valid(date),
        None => DateParse::Invalid,
    }
}

/// Predict the next cycle start: `last + cycle_length_days`.
///
/// Returns `None` only on calendar overflow, which the caller treats the
/// same as an invalid date.
pub fn predict_next(last: NaiveDate, cycle_length_days: u32) -> Option<NaiveDate> {
    last.checked_add_days(Days::new(u64::from(cycle_length_days)))
}

/// Format a date for display the way users type them: `dd/mm/yyyy`.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Render an RFC 3339 storage timestamp as a display date. Falls back to the
/// raw string if it does not parse (old or hand-edited rows).
pub fn display_timestamp(rfc3339: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| format_display(dt.date_naive()))
        .unwrap_or_else(|_| rfc3339.to_string())
}
