//! Remote tool protocol
//!
//! Request: `{"tool_name": .., "action": .., "params": {k: v}}` posted as JSON to
//! the endpoint bound to the tool.
//! Response: `{"status": "ok", "payload": ..}` or
//! `{"status": "error", "message": .., "code": ..?}`.

use crate::bridge::BridgeFailure;
use crate::ToolParams;
use serde::{Deserialize, Serialize};

/// Request sent to a remote tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Tool name
    pub tool_name: String,
    /// Action on the tool
    pub action: String,
    /// Flat string parameters
    #[serde(default)]
    pub params: ToolParams,
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// The action succeeded
    Ok,
    /// The tool server rejected or failed the action
    Error,
}

/// Response received from a remote tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Outcome status
    pub status: ToolStatus,
    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Optional error code (string or number on the wire)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,
}

impl ToolResponse {
    /// Success response
    #[must_use]
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            status: ToolStatus::Ok,
            payload: Some(payload),
            message: None,
            code: None,
        }
    }

    /// Error response
    #[must_use]
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            payload: None,
            message: Some(message.into()),
            code: Some(serde_json::Value::String(code.into())),
        }
    }

    /// Validate the response shape and turn it into an outcome.
    ///
    /// `ok` must carry a non-null payload and `error` must carry a message;
    /// anything else is a protocol mismatch rather than a coerced success.
    pub fn into_outcome(self) -> Result<serde_json::Value, BridgeFailure> {
        match self.status {
            ToolStatus::Ok => match self.payload {
                Some(payload) if !payload.is_null() => Ok(payload),
                _ => Err(BridgeFailure::ProtocolMismatch(
                    "status ok without payload".to_string(),
                )),
            },
            ToolStatus::Error => {
                let message = self.message.ok_or_else(|| {
                    BridgeFailure::ProtocolMismatch("status error without message".to_string())
                })?;
                let code = match self.code {
                    Some(serde_json::Value::String(s)) => s,
                    Some(serde_json::Value::Number(n)) => n.to_string(),
                    _ => "remote_error".to_string(),
                };
                Err(BridgeFailure::RemoteError { code, message })
            }
        }
    }
}

/// Parse and validate a raw response body.
pub fn decode_response(body: &[u8]) -> Result<serde_json::Value, BridgeFailure> {
    let response: ToolResponse = serde_json::from_slice(body)
        .map_err(|e| BridgeFailure::ProtocolMismatch(format!("malformed response: {}", e)))?;
    response.into_outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let mut params = ToolParams::new();
        params.insert("to".to_string(), "a@b.com".to_string());
        let request = ToolRequest {
            tool_name: "gmail".to_string(),
            action: "send".to_string(),
            params,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"tool_name": "gmail", "action": "send", "params": {"to": "a@b.com"}})
        );
    }

    #[test]
    fn test_decode_ok() {
        let value = decode_response(br#"{"status":"ok","payload":{"id":"m1"}}"#).unwrap();
        assert_eq!(value, json!({"id": "m1"}));
    }

    #[test]
    fn test_decode_error_with_numeric_code() {
        let err = decode_response(br#"{"status":"error","message":"quota","code":429}"#)
            .unwrap_err();
        assert_eq!(
            err,
            BridgeFailure::RemoteError {
                code: "429".to_string(),
                message: "quota".to_string()
            }
        );
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        for body in [
            &br#"{"status":"ok"}"#[..],
            br#"{"status":"ok","payload":null}"#,
            br#"{"status":"error"}"#,
            br#"{"status":"maybe","payload":1}"#,
            br#"{"payload":1}"#,
            b"<html>502</html>",
        ] {
            assert!(
                matches!(decode_response(body), Err(BridgeFailure::ProtocolMismatch(_))),
                "accepted {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
