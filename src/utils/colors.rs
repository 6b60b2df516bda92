//! ANSI color helper utilities for terminal output.

use crate::models::document::DocumentStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Pending → yellow, Approved → green, Rejected → red.
pub fn color_for_status(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Pending => YELLOW,
        DocumentStatus::Approved => GREEN,
        DocumentStatus::Rejected => RED,
    }
}

pub fn colorize_status(status: DocumentStatus) -> String {
    format!("{}{}{RESET}", color_for_status(status), status.to_db_str())
}

/// Days left before a deadline:
/// \<0 → red (overdue)
/// 0..=7 → yellow
/// otherwise → reset
pub fn color_for_days_left(days: i64) -> &'static str {
    if days < 0 {
        RED
    } else if days <= 7 {
        YELLOW
    } else {
        RESET
    }
}

pub fn colorize_days_left(days: i64) -> String {
    format!("{}{days}{RESET}", color_for_days_left(days))
}

/// Empty or missing values are shown as a grey `-`.
pub fn colorize_optional<T: AsRef<str>>(value: Option<T>) -> String {
    match value {
        Some(v) if !v.as_ref().trim().is_empty() => v.as_ref().to_string(),
        _ => format!("{GREY}-{RESET}"),
    }
}

/// Remove ANSI color sequences, e.g. to measure the printed width.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_removes_sequences_only() {
        let s = colorize_status(DocumentStatus::Approved);
        assert_eq!(strip_ansi(&s), "Approved");
        assert_eq!(strip_ansi("plain"), "plain");
    }

    #[test]
    fn optional_placeholder() {
        assert_eq!(strip_ansi(&colorize_optional(None::<&str>)), "-");
        assert_eq!(colorize_optional(Some("x")), "x");
    }
}
