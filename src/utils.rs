use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Wire format for timestamps: second precision, literal `Z` suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_utc_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts `YYYY-MM-DDTHH:MM:SSZ` as well as any RFC 3339 timestamp with an offset.
pub fn parse_utc_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("invalid timestamp {:?}; expected ISO 8601 UTC (e.g. 2024-12-09T00:00:00Z)", s))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| format!("invalid date {:?}; expected YYYY-MM-DD", s))
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Serde serializer writing `DateTime<Utc>` in [`TIMESTAMP_FORMAT`].
pub mod utc_seconds {
    use super::format_utc_timestamp;
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_utc_timestamp(ts))
    }
}
