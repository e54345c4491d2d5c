use anyhow::{Context, Result};
use ats_scanner::cli::{handle_scan, ScannerCli};
use ats_scanner::core::ConfigManager;
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ScannerCli::parse();

    // Loading is silent; its summary is logged once the subscriber exists.
    let loaded = ConfigManager::load(cli.config.as_deref())?;

    // The terminal belongs to the progress line, so logs go to a file.
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&loaded.config.log_file)
        .with_context(|| {
            format!(
                "Failed to open log file {}",
                loaded.config.log_file.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting ATS scanner v{}", env!("CARGO_PKG_VERSION"));
    loaded.log_summary();

    let displayed = handle_scan(cli, loaded.config).await?;
    if !displayed {
        std::process::exit(1);
    }
    Ok(())
}
