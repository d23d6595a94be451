//! Snapshot timestamp parsing.
//!
//! Scanners emit a few different shapes; all are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Parse a scan timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS` and
/// bare `YYYY-MM-DD` (midnight). Values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way it appears in computed output.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serde adapter for `DateTime<Utc>` fields that accept any shape
/// [`parse_timestamp`] understands.
pub mod serde_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("unparseable timestamp: {:?}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = parse_timestamp("2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let ts = parse_timestamp("2025-03-01T08:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap());

        let ts = parse_timestamp("2025-03-01 08:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let ts = parse_timestamp("2025-03-01T08:30:00.250").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        let ts = parse_timestamp("2025-03-01").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2025-13-01").is_none());
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2025-03-01T00:00:00Z");
    }
}
