use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use pestguard_core::config::LlmProvider;
use std::path::PathBuf;

mod app;
mod commands;
mod console;

#[derive(Parser)]
#[command(name = "pestguard")]
#[command(about = "PestGuard - pest detection and mitigation assistant")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// LLM provider (dashscope, ark, openai, custom)
    #[arg(long)]
    provider: Option<String>,

    /// Account file
    #[arg(long)]
    users: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a username and password
    Login,
    /// Create a new account
    Register,
    /// Log in and talk to the assistant
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config {
        Some(ref path) => pestguard_core::Settings::load_from(path),
        None => pestguard_core::Settings::load(),
    };

    if let Some(ref name) = cli.provider {
        let Some(provider) = LlmProvider::parse(name) else {
            bail!("unknown provider '{name}' (expected dashscope, ark, openai or custom)");
        };
        if provider != LlmProvider::Custom {
            let preset = provider.to_provider_id();
            settings.llm.api_key_env = preset.default_api_key_env().to_string();
            settings.llm.model = preset.default_model().to_string();
            settings.llm.base_url = None;
        }
        settings.llm.provider = provider;
    }
    if let Some(ref model) = cli.model {
        settings.llm.model = model.clone();
    }
    if let Some(users) = cli.users {
        settings.auth.users_path = users;
    }

    match cli.command {
        Command::Login => app::run_login(&settings).await?,
        Command::Register => app::run_register(&settings).await?,
        Command::Chat => app::run_chat(&settings).await?,
    }

    Ok(())
}
