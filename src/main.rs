use anyhow::Result;
use clap::Parser;
use treetop::{config, tui};

#[derive(Parser, Debug)]
#[command(name = "treetop")]
#[command(about = "Terminal tree viewer for hierarchical issue trackers")]
#[command(version)]
struct Args {
    /// Write a default config file and exit
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    /// Issue store command to invoke (overrides the config file)
    #[arg(long)]
    store: Option<String>,

    /// Seconds between automatic refreshes, 0 to disable (overrides the config file)
    #[arg(long)]
    refresh: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("treetop=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.init {
        let path = config::init()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = config::load(args.config.as_deref())?;
    if let Some(store) = args.store {
        config.store.command = store;
    }
    if let Some(refresh) = args.refresh {
        config.polling.refresh_interval_secs = refresh;
    }

    // Run TUI
    tui::run(config).await
}
