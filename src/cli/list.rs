//! `hive list` and `hive tools`

use crate::config::{load_agents, AgentDefinition};
use crate::team::build_registry;
use anyhow::Result;
use hive_tools::SCHEDULE_TOOL;
use std::path::Path;

pub fn agents(dir: &Path) -> Result<()> {
    let agents = load_agents(dir)?;
    if agents.is_empty() {
        println!("No agents in {}", dir.display());
        return Ok(());
    }
    for agent in &agents {
        println!("{}", agent_line(agent));
    }
    Ok(())
}

pub fn tools(dir: &Path) -> Result<()> {
    let agents = load_agents(dir)?;
    let registry = build_registry(&agents)?;
    let mut any = false;
    for agent in &agents {
        for line in tool_lines(agent, |name| registry.endpoint(name).map(str::to_string)) {
            println!("{}", line);
            any = true;
        }
    }
    if !any {
        println!("No tools configured");
    }
    Ok(())
}

fn agent_line(agent: &AgentDefinition) -> String {
    let tools: Vec<&str> = agent
        .file
        .tools
        .iter()
        .filter(|t| t.enabled)
        .map(|t| t.name.as_str())
        .collect();
    let llm = agent
        .file
        .llm
        .as_ref()
        .map(|l| format!(" llm={}/{}", l.provider, l.model))
        .unwrap_or_default();
    format!(
        "🤖 {:<12} skills=[{}] tools=[{}]{}",
        agent.name(),
        agent.file.skills.join(", "),
        tools.join(", "),
        llm
    )
}

fn tool_lines(
    agent: &AgentDefinition,
    endpoint: impl Fn(&str) -> Option<String>,
) -> Vec<String> {
    agent
        .file
        .tools
        .iter()
        .map(|tool| {
            let state = if tool.enabled { "enabled" } else { "disabled" };
            let target = if tool.name == SCHEDULE_TOOL {
                "built-in".to_string()
            } else {
                endpoint(&tool.name).unwrap_or_else(|| "no endpoint".to_string())
            };
            format!(
                "{:<12} {:<12} {:<8} [{}] {}",
                agent.name(),
                tool.name,
                state,
                tool.permissions.join(", "),
                target
            )
        })
        .collect()
}
