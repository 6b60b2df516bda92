//! Date helpers for the `YYYY-MM-DD` columns.

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date regex"))
}

/// Strict `YYYY-MM-DD`: the shape must match and the day must exist.
pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    let s = s.trim();
    if !date_shape().is_match(s) {
        return Err(AppError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| AppError::InvalidDate(s.to_string()))
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Parse a non-negative amount (cost, quantity) named `field` in errors.
pub fn parse_number(field: &str, value: &str) -> AppResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(AppError::InvalidNumber(field.to_string())),
    }
}

pub fn parse_count(field: &str, value: &str) -> AppResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Ok(v),
        _ => Err(AppError::InvalidNumber(field.to_string())),
    }
}
