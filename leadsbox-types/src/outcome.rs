//! Completed request outcomes reported by an HTTP client.

/// One completed REST call as seen by the client wrapper.
///
/// The monitor never looks at headers or bodies; this is all it gets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RequestOutcome {
    pub url: String,
    pub method: String,
    pub duration_ms: u64,
    /// HTTP status code. Zero when the request never got a response.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: u16,
    pub ok: bool,
}

impl RequestOutcome {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        duration_ms: u64,
        status: u16,
        ok: bool,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            duration_ms,
            status,
            ok,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_log_line() {
        let line = r#"{"url":"/api/threads/1/reply","method":"post","durationMs":120,"status":201,"ok":true}"#;
        let outcome: RequestOutcome = serde_json::from_str(line).unwrap();
        assert_eq!(outcome.duration_ms, 120);
        assert_eq!(outcome.status, 201);
        assert!(outcome.ok);
    }

    #[test]
    fn missing_status_defaults_to_zero() {
        let line = r#"{"url":"/x","method":"GET","durationMs":5,"ok":false}"#;
        let outcome: RequestOutcome = serde_json::from_str(line).unwrap();
        assert_eq!(outcome.status, 0);
    }
}
