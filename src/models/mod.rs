pub mod doctor;
pub mod enums;
pub mod file;
pub mod patient;
pub mod prescription;
pub mod request;
pub mod test_record;
pub mod visit;

pub use doctor::*;
pub use enums::*;
pub use file::*;
pub use patient::*;
pub use prescription::*;
pub use request::*;
pub use test_record::*;
pub use visit::*;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Parse a form-supplied record date.
///
/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp (the
/// browser's `Date.toISOString()`), keeping only the calendar date.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Accept a JSON number or a numeric string (HTML form inputs send strings).
/// Empty strings deserialize to `None`.
pub(crate) fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}
