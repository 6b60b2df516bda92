//! Timestamps stored in TEXT columns.

use chrono::Local;

pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS`.
///
/// The first ten characters are the calendar date, which is what the
/// "uploaded today" filters compare against.
pub fn now_stamp() -> String {
    Local::now().format(STAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_has_date_prefix() {
        let s = now_stamp();
        assert_eq!(s.len(), 19);
        assert!(chrono::NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").is_ok());
    }
}
