//! Backend timestamps
//!
//! The backend writes datetimes as `2024-05-01 09:30:00.123Z` and leaves
//! unset date fields as empty strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.fZ";

/// Parse a backend datetime; accepts RFC 3339 as well.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, BACKEND_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S%.3fZ").to_string()
}

/// Serde helper for optional datetime fields (`""` means unset)
pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_datetime(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_backend_format() {
        let dt = parse_datetime("2024-05-01 09:30:00.123Z").unwrap();
        assert_eq!(
            dt,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn test_parse_rfc3339_and_empty() {
        assert!(parse_datetime("2024-05-01T09:30:00Z").is_some());
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_format_then_parse() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let text = format_datetime(&dt);
        assert_eq!(text, "2025-01-02 03:04:05.000Z");
        assert_eq!(parse_datetime(&text), Some(dt));
    }
}
