//! Registry - tool name to endpoint binding
//!
//! Several agents may declare the same tool; the first declaration with an
//! endpoint binds it, later conflicting endpoints are ignored with a warning.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A remote tool and where it is served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEndpoint {
    /// Tool name as used in tool calls
    pub name: String,
    /// URL requests are POSTed to
    pub endpoint: String,
}

/// Registry of remote tool endpoints
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolEndpoint>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `endpoint`.
    ///
    /// Returns `true` when the binding was added, `false` when the tool was
    /// already bound (the existing binding is kept).
    pub fn register(&mut self, name: impl Into<String>, endpoint: impl Into<String>) -> Result<bool> {
        let name = name.into();
        let endpoint = endpoint.into();

        if name.trim().is_empty() {
            return Err(Error::Config("tool name must not be empty".to_string()));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "endpoint for tool '{}' must be an http(s) URL, got '{}'",
                name, endpoint
            )));
        }

        if let Some(existing) = self.tools.get(&name) {
            if existing.endpoint != endpoint {
                warn!(
                    tool = %name,
                    kept = %existing.endpoint,
                    ignored = %endpoint,
                    "Conflicting endpoint for tool, keeping first"
                );
            }
            return Ok(false);
        }

        debug!(tool = %name, endpoint = %endpoint, "Registered tool endpoint");
        self.tools
            .insert(name.clone(), ToolEndpoint { name, endpoint });
        Ok(true)
    }

    /// Endpoint for a tool
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&str> {
        self.tools.get(name).map(|t| t.endpoint.as_str())
    }

    /// All registered tools, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &ToolEndpoint> {
        self.tools.values()
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
