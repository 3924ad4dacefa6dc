use anyhow::{Context, Result};
use clap::Parser;
use futures_util::stream::StreamExt;
use std::sync::Arc;

use hostsentry::alert::AlertRouter;
use hostsentry::cli::{Cli, Commands, WatchArgs};
use hostsentry::config;
use hostsentry::init;
use hostsentry::watch::MonitorSession;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch(args) => run_watch(args).await,
        Commands::Init(args) => init::run_init(args.force),
    }
}

async fn run_watch(args: WatchArgs) -> Result<()> {
    args.validate()?;

    // An explicitly requested config file must load; only the default
    // location silently falls back to defaults.
    let mut cfg = match args.config {
        Some(ref path) => config::try_load_config_from(&config::expand_tilde(path))?,
        None => config::load_config(),
    };
    args.apply_to(&mut cfg);

    let channels: Vec<_> = cfg
        .default_alerts
        .iter()
        .filter_map(|s| hostsentry::alert::parse_alert_channel(s))
        .collect();
    let alert_router = Arc::new(AlertRouter::new(&channels));

    let mut session =
        MonitorSession::new(cfg, alert_router).context("invalid monitoring configuration")?;
    session.start().context("failed to start monitoring")?;

    eprintln!("Hostsentry watching... Press Ctrl+C to stop.");

    let mut signals = signal_hook_tokio::Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])
    .context("failed to install signal handler")?;
    signals.next().await;

    eprintln!("\nShutting down...");
    session.stop().await;

    Ok(())
}
