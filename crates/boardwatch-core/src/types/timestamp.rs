//! Serialization of the last-notified marker.
//!
//! Written as RFC 3339 UTC with second precision. Reads also accept any RFC 3339
//! offset and bare epoch seconds, which older deployments stored.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{BoardWatchError, Result};

/// Format a timestamp the way it is stored on the board.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored marker. Empty input is not a timestamp and yields `MalformedState`,
/// callers are expected to check for emptiness first.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Legacy: "1704067200" or "1704067200.5"
    let secs: f64 = text
        .parse()
        .map_err(|_| BoardWatchError::MalformedState(text.to_string()))?;
    if !secs.is_finite() {
        return Err(BoardWatchError::MalformedState(text.to_string()));
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
        .ok_or_else(|| BoardWatchError::MalformedState(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-02T00:00:00Z");
    }

    #[test]
    fn test_parse_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01T02:00:00+02:00").unwrap(), expected);
    }

    #[test]
    fn test_parse_legacy_epoch() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("1704067200").unwrap(), expected);
        assert_eq!(parse_timestamp("1704067200.0").unwrap(), expected);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_timestamp("yesterday"), Err(BoardWatchError::MalformedState(_))));
        assert!(matches!(parse_timestamp("NaN"), Err(BoardWatchError::MalformedState(_))));
        assert!(matches!(parse_timestamp(""), Err(BoardWatchError::MalformedState(_))));
    }
}
