//! `memsum` - gateway turning travel diary entries into structured memory summaries
//!
//! This binary loads configuration, wires the completion-service client into
//! the extraction pipeline and serves the two gateway endpoints.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use memsum_core::config::Config;

mod server;

/// Memory summary gateway
///
/// Fronts an OpenAI-compatible completion service with a raw chat proxy and
/// a diary-to-memory extraction endpoint.
#[derive(Parser, Debug)]
#[command(name = "memsum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file (defaults to memsum.yaml in CWD or the
    /// user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memsum=info,memsum_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_file(path)?;
            config.apply_env();
            config
        }
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    if !config.upstream.has_api_key() {
        tracing::warn!(
            "no upstream API key configured; set OPENROUTER_API_KEY or every call will fail"
        );
    }

    server::start_server(config).await
}
