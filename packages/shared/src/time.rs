use chrono::{DateTime, SecondsFormat, Utc};

/// Get the current time in UTC.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as ISO 8601 / RFC 3339 in UTC with millisecond precision.
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
