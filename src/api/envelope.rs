//! Uniform API response envelope.
//!
//! Every response carries `{success, data, message?, error?, timestamp}`,
//! with `success` derived from the HTTP status.

use axum::http::StatusCode;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// Successful envelope with payload.
pub fn success<T: Serialize>(data: T) -> Envelope<T> {
    Envelope {
        success: true,
        data: Some(data),
        message: None,
        error: None,
        timestamp: rfc3339_now(),
    }
}

/// Successful envelope with payload and a human-readable message.
pub fn success_with_message<T: Serialize>(data: T, message: &str) -> Envelope<T> {
    Envelope {
        success: true,
        data: Some(data),
        message: Some(message.to_string()),
        error: None,
        timestamp: rfc3339_now(),
    }
}

/// Error envelope. `success` follows the status code.
pub fn error(status: StatusCode, error: &str) -> Envelope<serde_json::Value> {
    Envelope {
        success: status.as_u16() < 400,
        data: None,
        message: None,
        error: Some(error.to_string()),
        timestamp: rfc3339_now(),
    }
}

/// Current time as an RFC 3339 UTC timestamp.
pub fn rfc3339_now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let days_since_epoch = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;

    let (year, month, day) = days_to_ymd(days_since_epoch as i64);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hours, minutes, seconds
    )
}

/// Convert days since Unix epoch to year, month, day.
fn days_to_ymd(days: i64) -> (i32, u32, u32) {
    // Algorithm from http://howardhinnant.github.io/date_algorithms.html
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = rfc3339_now();
        assert_eq!(ts.len(), 20);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_days_to_ymd() {
        assert_eq!(days_to_ymd(0), (1970, 1, 1));
        // 2024-01-15 is day 19737
        assert_eq!(days_to_ymd(19737), (2024, 1, 15));
    }

    #[test]
    fn test_success_envelope() {
        let env = success(serde_json::json!({"ok": true}));
        assert!(env.success);
        assert!(env.error.is_none());
    }

    #[test]
    fn test_error_envelope_follows_status() {
        let env = error(StatusCode::UNAUTHORIZED, "Authentication required");
        assert!(!env.success);
        assert_eq!(env.error.as_deref(), Some("Authentication required"));
    }
}
