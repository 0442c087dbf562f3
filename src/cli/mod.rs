//! CLI module for Hive
//!
//! - `start`: run the team on Discord
//! - `chat`: run the team in the terminal
//! - `init`: write a settings template and `.env`
//! - `add-agent`: scaffold an agent directory
//! - `list` / `tools`: show the configured team
//! - `test`: check every agent's LLM provider

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod add_agent;
pub mod chat;
pub mod check;
pub mod init;
pub mod list;
pub mod start;

/// Hive multi-agent team CLI
#[derive(Parser, Debug)]
#[command(name = "hive")]
#[command(about = "A team of chat agents sharing one conversation")]
#[command(version)]
pub struct Cli {
    /// Config directory (default: $HIVE_CONFIG_DIR or the platform config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect every agent to Discord and run the team
    Start,
    /// Talk to the team from the terminal
    Chat,
    /// Write a settings template and .env
    Init {
        /// Default LLM provider (openai, groq, anthropic, ollama)
        #[arg(long)]
        provider: Option<String>,
        /// Overwrite existing files without asking
        #[arg(long)]
        force: bool,
    },
    /// Scaffold a new agent
    AddAgent {
        /// Agent name
        name: String,
        /// Discord bot token
        #[arg(long)]
        token: Option<String>,
        /// Comma-separated skills
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        /// Comma-separated tool names
        #[arg(long, value_delimiter = ',')]
        tools: Vec<String>,
        /// LLM provider override
        #[arg(long)]
        provider: Option<String>,
        /// LLM model override
        #[arg(long, requires = "provider")]
        model: Option<String>,
    },
    /// List agents with their skills and tools
    List,
    /// List tools with permissions and endpoints
    Tools,
    /// Send a test completion through every agent's provider
    Test,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = cli.config_dir.unwrap_or_else(crate::config::config_dir);

    match cli.command {
        Some(Commands::Start) => start::run(&dir).await,
        Some(Commands::Chat) => chat::run(&dir).await,
        Some(Commands::Init { provider, force }) => init::run(&dir, provider, force),
        Some(Commands::AddAgent {
            name,
            token,
            skills,
            tools,
            provider,
            model,
        }) => add_agent::run(
            &dir,
            add_agent::NewAgent {
                name,
                token,
                skills,
                tools,
                provider,
                model,
            },
        ),
        Some(Commands::List) => list::agents(&dir),
        Some(Commands::Tools) => list::tools(&dir),
        Some(Commands::Test) => check::run(&dir).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_agent_args() {
        let cli = Cli::try_parse_from([
            "hive",
            "add-agent",
            "writer",
            "--skills",
            "email,drafting",
            "--tools",
            "gmail",
            "--provider",
            "openai",
            "--model",
            "gpt-4o-mini",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::AddAgent {
                name,
                skills,
                tools,
                model,
                ..
            }) => {
                assert_eq!(name, "writer");
                assert_eq!(skills, vec!["email", "drafting"]);
                assert_eq!(tools, vec!["gmail"]);
                assert_eq!(model.as_deref(), Some("gpt-4o-mini"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_model_requires_provider() {
        assert!(Cli::try_parse_from(["hive", "add-agent", "writer", "--model", "x"]).is_err());
    }

    #[test]
    fn test_global_config_dir() {
        let cli = Cli::try_parse_from(["hive", "list", "--config-dir", "/tmp/team"]).unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/team")));
    }
}
