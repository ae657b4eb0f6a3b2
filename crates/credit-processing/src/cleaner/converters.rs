//! Value-level conversions used by the column cleaner.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)(?:\s|$)").expect("Invalid regex: leading number")
});

/// Strip every `separator`, truncate to `max_len` characters and parse.
///
/// Returns `None` when the result is not a number.
pub(crate) fn parse_separated_number(value: &str, separator: char, max_len: usize) -> Option<f64> {
    let stripped: String = value
        .chars()
        .filter(|c| *c != separator)
        .take(max_len)
        .collect();

    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the leading whitespace-delimited token of a duration-like string.
///
/// `"22 Years and 1 Months"` becomes `22.0`.
pub(crate) fn extract_leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
