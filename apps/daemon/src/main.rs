use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;

/// Clipboard history daemon.
#[derive(Parser)]
#[command(name = "clipstash", version, about)]
struct Args {
    /// Clipboard polling interval in milliseconds.
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Override the history file location.
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Override the settings file location.
    #[arg(long)]
    settings_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,clipstash=debug")),
        )
        .init();

    let args = Args::parse();

    app::run(app::DaemonConfig {
        poll_interval: Duration::from_millis(args.interval_ms.max(1)),
        history_file: args.history_file,
        settings_file: args.settings_file,
    })
}
