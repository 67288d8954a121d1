use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use selection_translator::host::{self, HostOptions};

/// Translate text selections from stdin. Lines starting with ':' are commands
/// (:lang <code>, :from <code>, :history, :clear, :toggle, :hide, :langs, :quit).
/// Start a line with '::' to translate text that begins with a colon.
#[derive(Parser, Debug)]
#[command(name = "selection-translator", version)]
struct Cli {
    /// Target language code (overrides settings)
    #[arg(short, long)]
    target: Option<String>,

    /// Source language code, or "auto"
    #[arg(short, long)]
    from: Option<String>,

    /// Settings file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the history database
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("selection_translator=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    host::run(HostOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
        target_lang: cli.target,
        source_lang: cli.from,
        in_memory: cli.in_memory,
    })
    .await?;

    Ok(())
}
