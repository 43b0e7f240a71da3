//! Field cleaning and validation shared by the record inputs.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::errors::ModelError;

pub fn require(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_url(field: &str, value: &str) -> Result<(), ModelError> {
    require(field, value)?;
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ModelError::Validation(format!("{field} must be an http(s) URL")));
    }
    Ok(())
}

/// Like [`require_url`] but an empty value is accepted.
pub fn optional_url(field: &str, value: &str) -> Result<(), ModelError> {
    if value.is_empty() {
        return Ok(());
    }
    require_url(field, value)
}

pub fn clean_text(value: String) -> String {
    value.trim().to_string()
}

/// Trim every entry and drop the blank ones, keeping order.
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(clean_text).filter(|s| !s.is_empty())
}

/// Treat a JSON `null` like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Row timestamp in any of the shapes the backend writes.
///
/// RFC 3339 first, then Postgres text output (`2025-03-01 08:00:00+00`), then
/// a `timestamp without time zone`, which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `created_at` reader: `null`, a missing field or an unreadable stamp is `None`.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_list_drops_blank_lines() {
        let items = vec![" a ".to_string(), "".into(), "   ".into(), "b".into()];
        assert_eq!(clean_list(items), vec!["a", "b"]);
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(clean_optional(None), None);
    }

    #[test]
    fn url_rules() {
        assert!(require_url("image", "https://cdn/x.png").is_ok());
        assert!(require_url("image", "ftp://x").is_err());
        assert!(require_url("image", "").is_err());
        assert!(optional_url("image", "").is_ok());
    }

    #[test]
    fn timestamps_with_and_without_zone() {
        let utc = parse_timestamp("2025-03-01T08:00:00.123456+00:00").unwrap();
        assert_eq!(utc.to_rfc3339(), "2025-03-01T08:00:00.123456+00:00");
        assert_eq!(parse_timestamp("2025-03-01T08:00:00.123456"), Some(utc));
        assert_eq!(parse_timestamp("2025-03-01 08:00:00.123456"), Some(utc));
        assert_eq!(parse_timestamp("2025-03-01 10:00:00.123456+02"), Some(utc));
        assert_eq!(parse_timestamp("gestern"), None);
    }
}
