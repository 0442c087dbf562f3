//! Configuration loading
//!
//! Settings come from embedded defaults, then `<dir>/settings.toml`, then
//! `HIVE_*` environment variables. Agents are read from `<dir>/agents/` and
//! scheduled jobs live in `<dir>/schedules.toml`.

use super::agent::{AgentDefinition, AGENT_FILE};
use super::Settings;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Embedded default settings (compiled into binary)
pub const DEFAULT_SETTINGS: &str = include_str!("../../config/default.toml");

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Agents directory name inside the config directory
pub const AGENTS_DIR: &str = "agents";

/// Scheduled jobs file inside the config directory
pub const SCHEDULES_FILE: &str = "schedules.toml";

/// Load settings for the config directory `dir`
pub fn load_settings(dir: &Path) -> Result<Settings> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_SETTINGS, FileFormat::Toml))
        // 2. The team's settings file (optional)
        .add_source(File::from(dir.join(SETTINGS_FILE)).required(false))
        // 3. Environment variables (highest priority): HIVE_DEFAULT_LLM__MODEL
        .add_source(
            Environment::with_prefix("HIVE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Load every `agents/<name>/` under `dir`, sorted by directory name.
///
/// Directories without an `agent.toml` are skipped. A missing `agents/`
/// directory yields an empty list.
pub fn load_agents(dir: &Path) -> Result<Vec<AgentDefinition>> {
    let agents_dir = dir.join(AGENTS_DIR);
    if !agents_dir.exists() {
        debug!(path = %agents_dir.display(), "No agents directory");
        return Ok(Vec::new());
    }

    let mut dirs: Vec<_> = fs::read_dir(&agents_dir)
        .with_context(|| format!("Failed to read {}", agents_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let mut names = BTreeSet::new();
    let mut agents = Vec::with_capacity(dirs.len());
    for path in dirs {
        if !path.join(AGENT_FILE).exists() {
            warn!(path = %path.display(), "Skipping directory without agent.toml");
            continue;
        }
        let agent = AgentDefinition::load(&path)?;
        if !names.insert(agent.name().to_lowercase()) {
            bail!(
                "{}: agent name '{}' is already used by another agent",
                path.join(AGENT_FILE).display(),
                agent.name()
            );
        }
        agents.push(agent);
    }
    Ok(agents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_agent(root: &Path, dir: &str, name: &str) {
        let path = root.join(AGENTS_DIR).join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(
            path.join(AGENT_FILE),
            format!("name = \"{}\"\nskills = [\"email\"]\n", name),
        )
        .unwrap();
        fs::write(path.join("soul.md"), format!("I am {}.", name)).unwrap();
    }

    #[test]
    fn test_default_settings_parse() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.default_llm.provider, "groq");
        assert_eq!(settings.orchestrator.step_budget, 6);
        assert!(settings.orchestrator.mentions_are_exclusive);
        assert!(settings.scheduler.enabled);
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "[default_llm]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\n\n[orchestrator]\nstep_budget = 3\n",
        )
        .unwrap();

        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.default_llm.provider, "openai");
        assert_eq!(settings.default_llm.model, "gpt-4o-mini");
        assert_eq!(settings.orchestrator.step_budget, 3);
        assert_eq!(settings.orchestrator.context_window, 30);
    }

    #[test]
    fn test_load_agents_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(dir.path(), "writer", "writer");
        write_agent(dir.path(), "planner", "planner");
        fs::create_dir_all(dir.path().join(AGENTS_DIR).join("scratch")).unwrap();

        let agents = load_agents(dir.path()).unwrap();
        let names: Vec<_> = agents.iter().map(AgentDefinition::name).collect();
        assert_eq!(names, vec!["planner", "writer"]);
        assert_eq!(agents[1].persona, "I am writer.");
    }

    #[test]
    fn test_duplicate_agent_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_agent(dir.path(), "a", "writer");
        write_agent(dir.path(), "b", "Writer");

        let err = load_agents(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already used"));
    }

    #[test]
    fn test_missing_agents_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_agents(dir.path()).unwrap().is_empty());
    }
}
