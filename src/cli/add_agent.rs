//! `hive add-agent`: scaffold `agents/<name>/`

use crate::config::{AgentDefinition, AgentFile, DiscordLogin, ToolEntry, AGENTS_DIR};
use anyhow::{bail, Result};
use hive_core::LlmOverride;
use std::path::Path;

/// Actions granted to a new tool entry
pub const DEFAULT_PERMISSIONS: &[&str] = &["read", "write"];

/// Arguments of `hive add-agent`
#[derive(Debug, Clone, Default)]
pub struct NewAgent {
    pub name: String,
    pub token: Option<String>,
    pub skills: Vec<String>,
    pub tools: Vec<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl NewAgent {
    /// Definition to write under `dir`
    pub fn definition(&self, dir: &Path) -> Result<AgentDefinition> {
        let name = self.name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) || name.contains('/') {
            bail!("Invalid agent name '{}'", self.name);
        }

        let file = AgentFile {
            name: name.to_string(),
            skills: clean(&self.skills),
            discord: self.token.as_ref().map(|token| DiscordLogin {
                token: token.trim().to_string(),
            }),
            llm: self.provider.as_ref().map(|provider| LlmOverride {
                provider: provider.trim().to_lowercase(),
                model: self.model.clone().unwrap_or_default(),
            }),
            tools: clean(&self.tools)
                .into_iter()
                .map(|tool| ToolEntry {
                    name: tool,
                    enabled: true,
                    endpoint: None,
                    permissions: DEFAULT_PERMISSIONS.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
        };

        Ok(AgentDefinition {
            persona: persona_template(name, &file.skills),
            dir: dir.join(AGENTS_DIR).join(name),
            file,
        })
    }
}

fn clean(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !out.iter().any(|o| o == item) {
            out.push(item.to_string());
        }
    }
    out
}

fn persona_template(name: &str, skills: &[String]) -> String {
    if skills.is_empty() {
        format!("You are {}, a helpful member of the team.\n", name)
    } else {
        format!(
            "You are {}, the team's specialist in {}.\nAnswer when your skills are needed and hand off to teammates otherwise.\n",
            name,
            skills.join(", ")
        )
    }
}

pub fn run(dir: &Path, new: NewAgent) -> Result<()> {
    let def = new.definition(dir)?;
    if def.dir.exists() {
        bail!("Agent directory {} already exists", def.dir.display());
    }
    def.save()?;

    println!("✅ Agent '{}' created in {}", def.name(), def.dir.display());
    if def.file.discord.is_none() {
        println!("   Add a Discord bot token under [discord] in agent.toml before 'hive start'.");
    }
    if !def.file.tools.is_empty() {
        println!("   Set an endpoint for each tool in agent.toml (the built-in 'schedule' needs none).");
    }
    println!("   Edit soul.md to shape the persona.");
    Ok(())
}
