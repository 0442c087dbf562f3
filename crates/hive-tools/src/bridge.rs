//! Tool Bridge - carries an authorized tool call to the tool that serves it

use crate::error::{Error, Result};
use crate::protocol::{decode_response, ToolRequest};
use crate::ToolParams;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::{debug, instrument, warn};

/// Default per-call timeout
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a tool call produced no success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum BridgeFailure {
    /// The tool server could not be reached
    #[error("tool server unreachable: {0}")]
    Unreachable(String),

    /// No answer within the configured bound
    #[error("tool call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The tool server answered with an error
    #[error("tool error {code}: {message}")]
    RemoteError {
        /// Error code reported by the server (or HTTP status)
        code: String,
        /// Error message
        message: String,
    },

    /// The response did not have the expected shape
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),
}

/// One authorized tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Agent that requested the call
    pub agent: String,
    /// Tool name
    pub tool_name: String,
    /// Action on the tool
    pub action: String,
    /// Parameters
    pub params: ToolParams,
    /// Chat channel of the run that made the call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl ToolInvocation {
    /// Wire request for this invocation
    #[must_use]
    pub fn to_request(&self) -> ToolRequest {
        ToolRequest {
            tool_name: self.tool_name.clone(),
            action: self.action.clone(),
            params: self.params.clone(),
        }
    }
}

/// Something that can execute authorized tool calls.
///
/// Implementations must not retry: a tool action may not be idempotent.
#[async_trait::async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Execute one call, returning the success payload or a typed failure.
    async fn invoke(&self, invocation: &ToolInvocation)
        -> std::result::Result<serde_json::Value, BridgeFailure>;
}

/// HTTP bridge: POSTs the JSON request to the tool's endpoint.
#[derive(Debug, Clone)]
pub struct HttpToolBridge {
    client: Client,
    timeout: Duration,
}

impl HttpToolBridge {
    /// Create a bridge bounding every call by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Per-call timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` to `endpoint` and validate the answer.
    #[instrument(skip(self, request), fields(tool = %request.tool_name, action = %request.action))]
    pub async fn call(
        &self,
        endpoint: &str,
        request: &ToolRequest,
    ) -> std::result::Result<serde_json::Value, BridgeFailure> {
        debug!(endpoint, "Dispatching tool call");

        let exchange = async {
            let response = self
                .client
                .post(endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| BridgeFailure::Unreachable(e.to_string()))?;

            let status = response.status();
            let body = response.bytes().await.map_err(|e| {
                BridgeFailure::ProtocolMismatch(format!("failed to read response body: {}", e))
            })?;
            Ok::<_, BridgeFailure>((status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| BridgeFailure::Timeout(self.timeout))??;

        let outcome = decode_response(&body);
        if status.is_success() {
            return outcome;
        }

        // Non-2xx: honor a well-formed error body, otherwise report the status only.
        let failure = match outcome {
            Err(remote @ BridgeFailure::RemoteError { .. }) => remote,
            _ => BridgeFailure::RemoteError {
                code: status.as_u16().to_string(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected HTTP status")
                    .to_string(),
            },
        };
        warn!(endpoint, %failure, "Tool server returned HTTP {}", status);
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        assert_eq!(
            BridgeFailure::Timeout(Duration::from_millis(1500)).to_string(),
            "tool call timed out after 1500ms"
        );
        assert_eq!(
            BridgeFailure::RemoteError {
                code: "404".to_string(),
                message: "no such mailbox".to_string()
            }
            .to_string(),
            "tool error 404: no such mailbox"
        );
    }

    #[test]
    fn test_invocation_to_request() {
        let mut params = ToolParams::new();
        params.insert("q".to_string(), "inbox".to_string());
        let invocation = ToolInvocation {
            agent: "writer".to_string(),
            tool_name: "gmail".to_string(),
            action: "read".to_string(),
            params,
            channel_id: None,
        };
        let request = invocation.to_request();
        assert_eq!(request.tool_name, "gmail");
        assert_eq!(request.params.get("q").map(String::as_str), Some("inbox"));
    }

    #[test]
    fn test_failure_serializes_tagged() {
        let json = serde_json::to_value(BridgeFailure::Unreachable("refused".into())).unwrap();
        assert_eq!(json["kind"], "unreachable");
    }
}
