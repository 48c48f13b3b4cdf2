use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod track;
mod tui;

use cli::Cli;

/// Where log records go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Keeps the terminal clean while the TUI owns it
    File(PathBuf),
    Stderr,
}

#[tokio::main]
async fn main() {
    // Leave the alternate screen before the panic message is printed
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        tui::reset_terminal();
        error!("Application panicked: {}", panic_info);
        default_hook(panic_info);
    }));

    // Load environment variables from .env file, a missing file is fine
    dotenvy::dotenv().ok();

    if let Err(e) = Cli::parse().execute().await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Install the global subscriber, `RUST_LOG` wins over the defaults
pub fn init_logging(debug: bool, target: LogTarget) -> Result<()> {
    let default_filter = if debug { "trackview=debug" } else { "trackview=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log directory {}", parent.display()))?;
            }
            let file = File::options()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        LogTarget::Stderr => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}
