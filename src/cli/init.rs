use crate::config::{AGENTS_DIR, SETTINGS_FILE};
use anyhow::{bail, Context, Result};
use inquire::{Confirm, Select};
use std::fs;
use std::path::Path;

const PROVIDERS: &[&str] = &["groq", "openai", "anthropic", "ollama"];

pub fn run(dir: &Path, provider: Option<String>, force: bool) -> Result<()> {
    println!("🐝 Hive Setup\n");

    let provider = match provider {
        Some(p) => {
            let p = p.trim().to_lowercase();
            if !PROVIDERS.contains(&p.as_str()) {
                bail!("Unknown provider '{}'. Choose one of: {}", p, PROVIDERS.join(", "));
            }
            p
        }
        None => Select::new("Select the default LLM provider:", PROVIDERS.to_vec())
            .with_help_message("Agents can override this in their agent.toml")
            .prompt()?
            .to_string(),
    };

    let settings_path = dir.join(SETTINGS_FILE);
    if confirm_overwrite(&settings_path, force)? {
        fs::create_dir_all(dir.join(AGENTS_DIR))
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        fs::write(&settings_path, settings_template(&provider))
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        println!("✅ Settings saved to {}", settings_path.display());
    }

    let env_path = Path::new(".env");
    if confirm_overwrite(env_path, force)? {
        fs::write(env_path, env_template()).context("Failed to write .env")?;
        println!("✅ Environment template saved to .env");
    }

    println!("\nNext steps:");
    println!("  1. Put your API key in .env (HIVE_LLM_API_KEY=...)");
    println!("  2. Run 'hive add-agent <name> --token <discord token> --skills a,b'");
    println!("  3. Run 'hive test' to check the providers, then 'hive start'");

    Ok(())
}

fn confirm_overwrite(path: &Path, force: bool) -> Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    let overwrite = Confirm::new(&format!("{} already exists. Overwrite?", path.display()))
        .with_default(false)
        .prompt()?;
    if !overwrite {
        println!("Keeping {}", path.display());
    }
    Ok(overwrite)
}

/// `settings.toml` for a fresh team
pub fn settings_template(provider: &str) -> String {
    let mut content = String::from("# Hive settings\n\n");
    content.push_str("[default_llm]\n");
    content.push_str(&format!("provider = \"{}\"\n", provider));
    content.push_str("# Empty for the provider default\n");
    content.push_str("model = \"\"\n");
    if provider == "ollama" {
        content.push_str("base_url = \"http://localhost:11434/v1\"\n");
    }

    content.push_str("\n[orchestrator]\n");
    content.push_str("step_budget = 6\n");
    content.push_str("context_window = 30\n");
    content.push_str("mentions_are_exclusive = true\n");
    content.push_str("tool_results_trigger = true\n");

    content.push_str("\n[discord]\n");
    content.push_str("# Only listen in one channel\n");
    content.push_str("# channel_id = 0\n");

    content.push_str("\n[scheduler]\n");
    content.push_str("enabled = true\n");
    content.push_str("tick_secs = 30\n");
    content
}

/// `.env` template
pub fn env_template() -> String {
    let mut content = String::from("# Hive Environment Variables\n\n");
    content.push_str("# Shared LLM API key (falls back to OPENAI_API_KEY, GROQ_API_KEY, ...)\n");
    content.push_str("HIVE_LLM_API_KEY=\n");
    content.push_str("\n# Logging\n");
    content.push_str("RUST_LOG=hive=info,hive_core=info\n");
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_settings;

    #[test]
    fn test_settings_template_loads() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), settings_template("openai")).unwrap();

        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.default_llm.provider, "openai");
        assert!(settings.default_llm.base_url.is_none());
    }

    #[test]
    fn test_ollama_template_sets_base_url() {
        assert!(settings_template("ollama").contains("base_url"));
    }

    #[test]
    fn test_env_template_has_key() {
        assert!(env_template().contains("HIVE_LLM_API_KEY=\n"));
    }
}
