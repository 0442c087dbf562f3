//! Permission Gate
//!
//! `authorize` is a pure function of the agent profile and the parsed call.
//! A denial is an ordinary value; the caller records it in the transcript.

use crate::parser::ToolCallRequest;
use crate::profile::AgentProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What an agent may do with one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPermission {
    /// Disabled tools deny every action
    pub enabled: bool,
    /// Allowed actions (lower-case)
    pub allowed_actions: BTreeSet<String>,
}

impl ToolPermission {
    /// Enabled permission for `actions`
    #[must_use]
    pub fn allow<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            enabled: true,
            allowed_actions: actions
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// Same actions, disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Reason a tool call was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PermissionDenial {
    /// The agent has no entry for the tool
    ToolNotGranted {
        /// Tool name
        tool: String,
    },
    /// The entry exists but is disabled
    ToolDisabled {
        /// Tool name
        tool: String,
    },
    /// The action is outside the allowed set
    ActionNotAllowed {
        /// Tool name
        tool: String,
        /// Requested action
        action: String,
    },
}

impl std::fmt::Display for PermissionDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolNotGranted { tool } => write!(f, "tool '{}' is not granted", tool),
            Self::ToolDisabled { tool } => write!(f, "tool '{}' is disabled", tool),
            Self::ActionNotAllowed { tool, action } => {
                write!(f, "action '{}' is not allowed on '{}'", action, tool)
            }
        }
    }
}

impl std::error::Error for PermissionDenial {}

/// Check a parsed call against the agent's permissions.
pub fn authorize(profile: &AgentProfile, request: &ToolCallRequest) -> Result<(), PermissionDenial> {
    let permission = profile.permissions.get(&request.tool_name).ok_or_else(|| {
        PermissionDenial::ToolNotGranted {
            tool: request.tool_name.clone(),
        }
    })?;

    if !permission.enabled {
        return Err(PermissionDenial::ToolDisabled {
            tool: request.tool_name.clone(),
        });
    }

    if !permission.allowed_actions.contains(&request.action) {
        return Err(PermissionDenial::ActionNotAllowed {
            tool: request.tool_name.clone(),
            action: request.action.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests;
