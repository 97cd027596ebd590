use anyhow::{Context, Result};
use clap::Parser;
use resume_enhancer::cli::{handle_command, load_config, Cli};
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Logs go to a file so they don't interleave with the wizard prompts
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&config.logging.file)
        .with_context(|| format!("Failed to open log file {}", config.logging.file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level")?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(filter)
        .init();

    info!("Starting resume enhancer against {}", config.service.api_url);

    handle_command(cli, config).await
}
