//! Uniform result of every remote call
//!
//! A received 2xx response becomes [`Envelope::Success`], any other received
//! response becomes [`Envelope::Failure`] with the real status code, and a
//! call that never got a response becomes a `Failure` with status code 0.

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::transport::{TransportError, TransportResponse};

/// Error text used when a rejected response carries no `message`
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// Error text used when a raw content fetch is rejected
pub const DOWNLOAD_FAILURE_MESSAGE: &str = "Download failed";

/// Status code reserved for calls that received no response
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Outcome of a remote call
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success {
        data: Option<Value>,
        message: Option<String>,
        status_code: u16,
        raw_response: Option<Value>,
    },
    Failure {
        error: String,
        status_code: u16,
        raw_response: Option<Value>,
    },
}

impl Envelope {
    /// Classify a received response
    pub fn from_response(response: &TransportResponse) -> Self {
        let body = response.json();
        let field = |name: &str| {
            body.as_ref()
                .and_then(|b| b.get(name))
                .filter(|v| !v.is_null())
                .cloned()
        };

        if response.is_success() {
            Envelope::Success {
                data: field("data"),
                message: field("message").map(value_to_text),
                status_code: response.status,
                raw_response: body,
            }
        } else {
            Envelope::Failure {
                error: field("message")
                    .map(value_to_text)
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
                status_code: response.status,
                raw_response: body,
            }
        }
    }

    /// Failure for a call that never received a response
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Envelope::Failure {
            error: error.into(),
            status_code: TRANSPORT_FAILURE_STATUS,
            raw_response: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// True when the failure happened below HTTP (no response received)
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Envelope::Failure {
                status_code: TRANSPORT_FAILURE_STATUS,
                ..
            }
        )
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Envelope::Success { status_code, .. } | Envelope::Failure { status_code, .. } => {
                *status_code
            }
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Envelope::Success { data, .. } => data.as_ref(),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Envelope::Success { message, .. } => message.as_deref(),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure { error, .. } => Some(error),
        }
    }

    pub fn raw_response(&self) -> Option<&Value> {
        match self {
            Envelope::Success { raw_response, .. } | Envelope::Failure { raw_response, .. } => {
                raw_response.as_ref()
            }
        }
    }
}

impl From<TransportError> for Envelope {
    fn from(err: TransportError) -> Self {
        Envelope::transport_failure(err.to_string())
    }
}

#[derive(Serialize)]
struct EnvelopeRepr<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_response: Option<&'a Value>,
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnvelopeRepr {
            success: self.is_success(),
            data: self.data(),
            message: self.message(),
            error: self.error(),
            status_code: self.status_code(),
            raw_response: self.raw_response(),
        }
        .serialize(serializer)
    }
}

/// Result of fetching an object's bytes without JSON decoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    Fetched {
        bytes: Bytes,
        content_type: Option<String>,
        content_length: Option<u64>,
    },
    Failed {
        error: String,
        status_code: u16,
    },
}

impl RawContent {
    /// Classify a received response, keeping the body unparsed
    pub fn from_response(response: TransportResponse) -> Self {
        if !response.is_success() {
            return RawContent::Failed {
                error: DOWNLOAD_FAILURE_MESSAGE.to_string(),
                status_code: response.status,
            };
        }
        let content_type = response.header("content-type").map(str::to_string);
        let content_length = response
            .header("content-length")
            .and_then(|v| v.trim().parse().ok());
        RawContent::Fetched {
            bytes: response.body,
            content_type,
            content_length,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RawContent::Fetched { .. })
    }
}

impl From<TransportError> for RawContent {
    fn from(err: TransportError) -> Self {
        RawContent::Failed {
            error: err.to_string(),
            status_code: TRANSPORT_FAILURE_STATUS,
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_fields() {
        let body = json!({"data": {"key": "a.txt"}, "message": "Uploaded"});
        let env = Envelope::from_response(&TransportResponse::json_body(201, &body));
        assert_eq!(
            env,
            Envelope::Success {
                data: Some(json!({"key": "a.txt"})),
                message: Some("Uploaded".to_string()),
                status_code: 201,
                raw_response: Some(body),
            }
        );
    }

    #[test]
    fn test_success_without_data_or_json() {
        let env = Envelope::from_response(&TransportResponse::new(204, ""));
        assert!(env.is_success());
        assert!(env.data().is_none());
        assert!(env.message().is_none());
        assert!(env.raw_response().is_none());
        assert_eq!(env.status_code(), 204);
    }

    #[test]
    fn test_not_found_uses_message() {
        let body = json!({"message": "not found"});
        let env = Envelope::from_response(&TransportResponse::json_body(404, &body));
        assert_eq!(
            env,
            Envelope::Failure {
                error: "not found".to_string(),
                status_code: 404,
                raw_response: Some(body),
            }
        );
    }

    #[test]
    fn test_failure_defaults_error_text() {
        let env = Envelope::from_response(&TransportResponse::new(500, "<html>oops</html>"));
        assert_eq!(env.error(), Some(DEFAULT_FAILURE_MESSAGE));
        assert_eq!(env.status_code(), 500);
        assert!(env.raw_response().is_none());

        let null_message = json!({"message": null, "errors": ["x"]});
        let env = Envelope::from_response(&TransportResponse::json_body(422, &null_message));
        assert_eq!(env.error(), Some(DEFAULT_FAILURE_MESSAGE));
        assert_eq!(env.raw_response(), Some(&null_message));
    }

    #[test]
    fn test_transport_failure_has_zero_status() {
        let env: Envelope = TransportError::Timeout("operation timed out".to_string()).into();
        assert_eq!(
            env,
            Envelope::Failure {
                error: "operation timed out".to_string(),
                status_code: 0,
                raw_response: None,
            }
        );
        assert!(env.is_transport_failure());
    }

    #[test]
    fn test_serialized_shape() {
        let env = Envelope::Success {
            data: Some(json!([1, 2])),
            message: None,
            status_code: 200,
            raw_response: Some(json!({"data": [1, 2]})),
        };
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({
                "success": true,
                "data": [1, 2],
                "status_code": 200,
                "raw_response": {"data": [1, 2]}
            })
        );

        let env = Envelope::transport_failure("connection refused");
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"success": false, "error": "connection refused", "status_code": 0})
        );
    }

    #[test]
    fn test_raw_content_keeps_body_and_headers() {
        let resp = TransportResponse::new(200, Bytes::from_static(b"\x89PNG"))
            .with_header("Content-Type", "image/png")
            .with_header("Content-Length", "4");
        match RawContent::from_response(resp) {
            RawContent::Fetched {
                bytes,
                content_type,
                content_length,
            } => {
                assert_eq!(&bytes[..], b"\x89PNG");
                assert_eq!(content_type.as_deref(), Some("image/png"));
                assert_eq!(content_length, Some(4));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_raw_content_failure() {
        let raw = RawContent::from_response(TransportResponse::new(403, "{}"));
        assert_eq!(
            raw,
            RawContent::Failed {
                error: DOWNLOAD_FAILURE_MESSAGE.to_string(),
                status_code: 403,
            }
        );
    }
}
