//! Response configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path bound to the default response.
pub const DEFAULT_PATH: &str = "/";

/// Body served for unmatched non-root paths.
pub const NOT_FOUND_BODY: &str = r#"{"error": "path not found"}"#;

/// Final status codes a configured response may carry. 1xx codes are
/// interim responses and cannot end an exchange.
pub const FINAL_STATUS_RANGE: std::ops::RangeInclusive<u16> = 200..=999;

/// Configured response for a single path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PathResponse {
    pub status_code: u16,
    /// Returned verbatim, typically JSON
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub advanced: AdvancedBehavior,
}

/// Connection-level behavior applied before (or instead of) the response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AdvancedBehavior {
    /// Park the request until an operator resolves it
    pub hang_up: bool,
    /// Seconds to wait before any other behavior
    pub timeout: f64,
    /// Reset the connection without writing a response
    pub reject_request: bool,
    /// Seconds to wait before a normal response
    pub delay: f64,
}

impl PathResponse {
    /// 200 response with no advanced behavior
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            advanced: AdvancedBehavior::default(),
        }
    }

    /// Built-in response for paths with no configuration
    pub fn not_found() -> Self {
        Self::with_status(404, NOT_FOUND_BODY)
    }

    /// Validate status code range and wait durations
    pub fn validate(&self) -> Result<(), String> {
        if !FINAL_STATUS_RANGE.contains(&self.status_code) {
            return Err(format!(
                "statusCode must be between 200 and 999, got {}",
                self.status_code
            ));
        }
        self.advanced.validate()
    }
}

impl AdvancedBehavior {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("timeout", self.timeout), ("delay", self.delay)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "advanced.{name} must be a non-negative number of seconds, got {value}"
                ));
            }
        }
        Ok(())
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        seconds_to_duration(self.timeout)
    }

    pub fn delay_duration(&self) -> Option<Duration> {
        seconds_to_duration(self.delay)
    }
}

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    if seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).ok()
    } else {
        None
    }
}

/// Errors returned by the response registry
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_response_deserialize_defaults() {
        let json = r#"{"statusCode": 201}"#;
        let response: PathResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status_code, 201);
        assert_eq!(response.body, "");
        assert_eq!(response.advanced, AdvancedBehavior::default());
    }

    #[test]
    fn test_path_response_wire_format() {
        let mut response = PathResponse::with_status(202, r#"{"ok":true}"#);
        response.advanced.hang_up = true;
        response.advanced.delay = 1.5;

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 202);
        assert_eq!(value["body"], r#"{"ok":true}"#);
        assert_eq!(value["advanced"]["hangUp"], true);
        assert_eq!(value["advanced"]["rejectRequest"], false);
        assert_eq!(value["advanced"]["timeout"], 0.0);
        assert_eq!(value["advanced"]["delay"], 1.5);
    }

    #[test]
    fn test_validate_status_code() {
        assert!(PathResponse::ok("").validate().is_ok());
        assert!(PathResponse::with_status(99, "").validate().is_err());
        assert!(PathResponse::with_status(1000, "").validate().is_err());
        assert!(PathResponse::with_status(999, "").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_informational_status() {
        for code in [100, 101, 150, 199] {
            let err = PathResponse::with_status(code, "").validate().unwrap_err();
            assert!(err.contains("statusCode"), "{code}: {err}");
        }
        assert!(PathResponse::with_status(200, "").validate().is_ok());
    }

    #[test]
    fn test_path_response_rejects_unknown_fields() {
        let result = serde_json::from_str::<PathResponse>(r#"{"statusCode":200,"bdy":"typo"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_waits() {
        let mut response = PathResponse::ok("");
        response.advanced.timeout = -1.0;
        assert!(response.validate().unwrap_err().contains("timeout"));

        response.advanced.timeout = 0.0;
        response.advanced.delay = f64::NAN;
        assert!(response.validate().unwrap_err().contains("delay"));
    }

    #[test]
    fn test_wait_durations() {
        let behavior = AdvancedBehavior {
            timeout: 0.25,
            delay: 0.0,
            ..Default::default()
        };
        assert_eq!(
            behavior.timeout_duration(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(behavior.delay_duration(), None);
    }

    #[test]
    fn test_not_found_response() {
        let response = PathResponse::not_found();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, NOT_FOUND_BODY);
    }
}
