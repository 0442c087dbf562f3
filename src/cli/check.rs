//! `hive test`: one "Say hello" completion per agent

use crate::config::{load_agents, load_settings};
use anyhow::{bail, Result};
use hive_core::format_error_for_cli;
use hive_llm::{CompletionRequest, LlmProvider, Message};
use std::path::Path;
use std::time::Duration;

const HELLO_PROMPT: &str = "Say hello in one short sentence.";

async fn say_hello(llm: &dyn LlmProvider, model: &str) -> hive_llm::Result<String> {
    let request = CompletionRequest::new(model)
        .with_message(Message::user(HELLO_PROMPT))
        .with_max_tokens(64);
    Ok(llm.complete(request).await?.content.trim().to_string())
}

pub async fn run(dir: &Path) -> Result<()> {
    let settings = load_settings(dir)?;
    let agents = load_agents(dir)?;
    if agents.is_empty() {
        bail!("No agents configured. Run 'hive add-agent <name>' first.");
    }

    let timeout = Duration::from_secs(settings.orchestrator.completion_timeout_secs.max(1));
    let mut failures = 0;
    for agent in &agents {
        let selection = settings.default_llm.selection(agent.file.llm.as_ref(), timeout);
        let result = match hive_llm::provider_from_selection(&selection) {
            Ok(llm) => say_hello(llm.as_ref(), &selection.model).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(reply) => println!("✅ {} ({}): {}", agent.name(), selection.provider, reply),
            Err(e) => {
                failures += 1;
                println!(
                    "❌ {} ({}): {}",
                    agent.name(),
                    selection.provider,
                    format_error_for_cli(&hive_core::Error::Llm(e))
                );
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} agents failed the provider check", failures, agents.len());
    }
    Ok(())
}
