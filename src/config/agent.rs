//! `agents/<name>/agent.toml` and `soul.md`

use anyhow::{bail, Context, Result};
use hive_core::{AgentProfile, LlmOverride, ToolPermission};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Agent definition file name
pub const AGENT_FILE: &str = "agent.toml";
/// Persona file name
pub const SOUL_FILE: &str = "soul.md";

/// Contents of `agent.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentFile {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordLogin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmOverride>,
    #[serde(default)]
    pub tools: Vec<ToolEntry>,
}

/// `[discord]` section
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordLogin {
    pub token: String,
}

impl std::fmt::Debug for DiscordLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordLogin").field("token", &"[REDACTED]").finish()
    }
}

/// One `[[tools]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl AgentFile {
    /// Check the fields a roster and a registry cannot check on their own
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("{}: 'name' must not be empty", path.display());
        }
        let mut seen = BTreeSet::new();
        for (index, tool) in self.tools.iter().enumerate() {
            let name = tool.name.trim();
            if name.is_empty() {
                bail!("{}: 'tools[{}].name' must not be empty", path.display(), index);
            }
            if !seen.insert(name.to_string()) {
                bail!("{}: tool '{}' is listed twice", path.display(), name);
            }
            if let Some(endpoint) = &tool.endpoint {
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    bail!(
                        "{}: 'tools[{}].endpoint' must be an http(s) URL",
                        path.display(),
                        index
                    );
                }
            }
        }
        if let Some(llm) = &self.llm {
            if llm.provider.trim().is_empty() {
                bail!("{}: 'llm.provider' must not be empty", path.display());
            }
        }
        Ok(())
    }
}

/// A loaded agent: its file, persona and directory
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub file: AgentFile,
    pub persona: String,
    pub dir: PathBuf,
}

impl AgentDefinition {
    /// Read `agent.toml` and `soul.md` from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(AGENT_FILE);
        let text =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let file: AgentFile =
            toml::from_str(&text).with_context(|| format!("Invalid {}", path.display()))?;
        file.validate(&path)?;

        let soul = dir.join(SOUL_FILE);
        let persona = if soul.exists() {
            fs::read_to_string(&soul).with_context(|| format!("Failed to read {}", soul.display()))?
        } else {
            String::new()
        };

        Ok(Self {
            file,
            persona,
            dir: dir.to_path_buf(),
        })
    }

    /// Write `agent.toml` and `soul.md` into `dir`
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let content = toml::to_string_pretty(&self.file).context("Failed to serialize agent")?;
        fs::write(self.dir.join(AGENT_FILE), content).context("Failed to write agent.toml")?;
        fs::write(self.dir.join(SOUL_FILE), &self.persona).context("Failed to write soul.md")?;
        Ok(())
    }

    /// Agent name
    #[must_use]
    pub fn name(&self) -> &str {
        self.file.name.trim()
    }

    /// Core profile for the roster
    #[must_use]
    pub fn profile(&self) -> AgentProfile {
        let mut profile = AgentProfile::new(self.name())
            .with_skills(self.file.skills.iter().map(|s| s.trim().to_string()))
            .with_persona(self.persona.trim());
        for tool in &self.file.tools {
            let mut permission = ToolPermission::allow(tool.permissions.iter().map(String::as_str));
            if !tool.enabled {
                permission = permission.disabled();
            }
            profile = profile.with_tool(tool.name.trim(), permission);
        }
        if let Some(llm) = &self.file.llm {
            profile = profile.with_llm_override(llm.clone());
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRITER: &str = r#"
name = "writer"
skills = ["email", "drafting"]

[discord]
token = "MTIz.secret"

[llm]
provider = "openai"
model = "gpt-4o-mini"

[[tools]]
name = "gmail"
endpoint = "http://localhost:9000/gmail"
permissions = ["read", "Send"]

[[tools]]
name = "schedule"
enabled = false
permissions = ["write"]
"#;

    #[test]
    fn test_profile_from_file() {
        let file: AgentFile = toml::from_str(WRITER).unwrap();
        file.validate(Path::new("agent.toml")).unwrap();
        let def = AgentDefinition {
            file,
            persona: "You write emails.\n".to_string(),
            dir: PathBuf::from("agents/writer"),
        };

        let profile = def.profile();
        assert_eq!(profile.name, "writer");
        assert_eq!(profile.skills, vec!["email", "drafting"]);
        assert_eq!(profile.persona, "You write emails.");
        assert!(profile.permissions["gmail"].allowed_actions.contains("send"));
        assert!(!profile.permissions["schedule"].enabled);
        assert_eq!(profile.llm_override.unwrap().model, "gpt-4o-mini");
    }

    #[test]
    fn test_validation_names_key() {
        let mut file: AgentFile = toml::from_str(WRITER).unwrap();
        file.tools[0].endpoint = Some("ftp://nope".to_string());
        let err = file.validate(Path::new("agents/writer/agent.toml")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("agents/writer/agent.toml"));
        assert!(msg.contains("tools[0].endpoint"));
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let mut file: AgentFile = toml::from_str(WRITER).unwrap();
        file.tools[1].name = "gmail".to_string();
        assert!(file.validate(Path::new("agent.toml")).is_err());
    }

    #[test]
    fn test_login_debug_masks_token() {
        let file: AgentFile = toml::from_str(WRITER).unwrap();
        assert!(!format!("{:?}", file).contains("secret"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file: AgentFile = toml::from_str(WRITER).unwrap();
        let def = AgentDefinition {
            file,
            persona: "You write emails.".to_string(),
            dir: dir.path().join("writer"),
        };
        def.save().unwrap();

        let loaded = AgentDefinition::load(&dir.path().join("writer")).unwrap();
        assert_eq!(loaded.name(), "writer");
        assert_eq!(loaded.file.tools, def.file.tools);
        assert_eq!(loaded.persona, "You write emails.");
    }
}
