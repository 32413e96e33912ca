mod form;
mod interactive;
mod noninteractive;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::chat::ChatSession;
use crate::core::config::{self, AppConfig};
use crate::core::error::AppError;
use crate::core::model::ModelId;

#[derive(Parser, Debug)]
#[command(
    name = "prompt-creator",
    version,
    about = "Chat with a prompt engineering assistant and export the transcript"
)]
struct Cli {
    /// API key for the chat-completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model to use (overrides config and skips the model menu)
    #[arg(short, long)]
    model: Option<String>,

    /// Non-interactive mode: send a single message and print the reply
    #[arg(short, long)]
    prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(short = 'f', long, default_value = "text")]
    output_format: OutputFormat,

    /// Export the transcript after a non-interactive turn
    #[arg(long)]
    export: bool,

    /// Use the full-screen form instead of the line prompt
    #[arg(long)]
    tui: bool,

    /// Working directory (config lookup and default export location)
    #[arg(short = 'c', long = "cwd")]
    working_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config(cli.working_dir.clone()).map_err(AppError::from)?;

    init_logging(cli.debug || config.debug, cli.tui);

    if config.export_dir.is_none() {
        config.export_dir = cli.working_dir.clone();
    }

    let api_key = cli
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| config.get_api_key().map(str::to_string));
    let preset_model = cli.model.clone().map(ModelId);

    tracing::debug!(
        base_url = %config.base_url,
        default_model = %config.default_model,
        max_retries = config.max_retries,
        has_api_key = api_key.is_some(),
        "starting"
    );

    let session = ChatSession::new(config);

    if let Some(prompt) = cli.prompt {
        let model = initial_model(session.config(), preset_model);
        noninteractive::run(session, api_key, model, prompt, cli.output_format, cli.export).await
    } else if cli.tui {
        form::run(session, api_key, preset_model).await
    } else {
        interactive::run(session, api_key, preset_model).await
    }
}

fn init_logging(debug: bool, full_screen: bool) {
    let filter = if full_screen && !debug {
        EnvFilter::new("off")
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Model used when no `--model` was given: the configured default.
fn initial_model(config: &AppConfig, preset: Option<ModelId>) -> ModelId {
    preset.unwrap_or_else(|| config.default_model.clone())
}
