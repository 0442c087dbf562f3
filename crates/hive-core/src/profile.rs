//! Agent profiles and the team roster

use crate::error::{Error, Result};
use crate::permissions::ToolPermission;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-agent LLM provider/model override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmOverride {
    /// Provider name
    pub provider: String,
    /// Model name (empty for the provider default)
    #[serde(default)]
    pub model: String,
}

/// One agent's identity, persona and tool permissions. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent name
    pub name: String,
    /// Skills, in declared order
    pub skills: Vec<String>,
    /// Persona text (soul)
    #[serde(default)]
    pub persona: String,
    /// Tool name to permission
    #[serde(default)]
    pub permissions: BTreeMap<String, ToolPermission>,
    /// Optional LLM override
    #[serde(default)]
    pub llm_override: Option<LlmOverride>,
}

impl AgentProfile {
    /// Profile with no skills, persona or tools
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skills: Vec::new(),
            persona: String::new(),
            permissions: BTreeMap::new(),
            llm_override: None,
        }
    }

    /// Set skills
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set persona
    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Grant a tool
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>, permission: ToolPermission) -> Self {
        self.permissions.insert(tool.into(), permission);
        self
    }

    /// Set LLM override
    #[must_use]
    pub fn with_llm_override(mut self, llm: LlmOverride) -> Self {
        self.llm_override = Some(llm);
        self
    }

    /// Enabled tools with their allowed actions
    pub fn enabled_tools(&self) -> impl Iterator<Item = (&str, &ToolPermission)> {
        self.permissions
            .iter()
            .filter(|(_, p)| p.enabled)
            .map(|(name, p)| (name.as_str(), p))
    }

    /// First non-empty persona line, used for relevance checks
    #[must_use]
    pub fn persona_summary(&self) -> &str {
        self.persona
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("Hive agent")
    }
}

/// The team: agent profiles in a fixed order with unique names
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: Vec<Arc<AgentProfile>>,
}

impl Roster {
    /// Build a roster, rejecting empty and duplicate names (case-insensitive)
    pub fn new(profiles: Vec<AgentProfile>) -> Result<Self> {
        let mut agents: Vec<Arc<AgentProfile>> = Vec::with_capacity(profiles.len());
        for mut profile in profiles {
            let name = profile.name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(Error::Configuration(format!(
                    "invalid agent name '{}'",
                    profile.name
                )));
            }
            if agents.iter().any(|a| a.name.eq_ignore_ascii_case(name)) {
                return Err(Error::Configuration(format!(
                    "duplicate agent name '{}'",
                    profile.name
                )));
            }
            profile.name = name.to_string();
            agents.push(Arc::new(profile));
        }
        Ok(Self { agents })
    }

    /// Profile by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<AgentProfile>> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Canonical agent name for a mention token (case-insensitive)
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.agents
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(token))
            .map(|a| a.name.as_str())
    }

    /// Whether `name` is on the roster
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Profiles in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AgentProfile>> {
        self.agents.iter()
    }

    /// Agent names in roster order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.name.as_str())
    }

    /// Team size
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the team is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
