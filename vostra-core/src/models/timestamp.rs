//! Timestamp parsing for backend records.
//!
//! The backend emits RFC 3339 values from some endpoints and naive ISO-8601
//! values (implicitly UTC) from others.

use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// serde adapter for `Option<DateTime<Utc>>` fields.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => super::parse(&value)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {value}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2025-06-09T14:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 12);
    }

    #[test]
    fn parses_naive_values_as_utc() {
        let ts = parse("2025-06-09T14:30:00.123456").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2025, 6, 9, 14));
        assert!(parse("2025-06-09 14:30:00").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("igår").is_none());
    }
}
