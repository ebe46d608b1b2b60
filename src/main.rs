use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use jobscout::{pipeline, AppConfig};

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Poll job boards, filter postings, and notify new matches")]
struct Cli {
    /// Path to the configuration document
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let summary = pipeline::run(&config).await?;

    info!(
        "Run finished: {} collected, {} matched, {} delivered in {} chunks",
        summary.collected, summary.matched, summary.delivered, summary.chunks
    );

    Ok(())
}
