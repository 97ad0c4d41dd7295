//! Free-text input sanitation.
//!
//! # Responsibility
//! - Normalize title/description text before it reaches storage.
//!
//! # Invariants
//! - Sanitized titles carry no raw HTML-significant characters.
//! - Sanitation runs before any business validation.

use once_cell::sync::Lazy;
use regex::Regex;

static CONTROL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("valid control-char regex"));

/// Sanitizes a ticket title: trim, strip control characters, escape HTML.
pub fn sanitize_title(raw: &str) -> String {
    escape_html(&strip_control_chars(raw.trim()))
}

/// Sanitizes a free-text description: trim and strip control characters.
///
/// Descriptions are rendered as plain text by the board, so HTML escaping
/// stays on the title path only.
pub fn sanitize_description(raw: &str) -> String {
    strip_control_chars(raw.trim())
}

fn strip_control_chars(value: &str) -> String {
    CONTROL_CHARS_RE.replace_all(value, "").into_owned()
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}
