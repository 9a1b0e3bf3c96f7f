//! Meridian server
//!
//! Run with: cargo run -- --static-dir ./client/dist
//!
//! # Configuration
//!
//! Config file lookup: `--config`, then `~/.config/meridian/config.toml`,
//! `/etc/meridian/config.toml`, `./config.toml`. The first file found must
//! load cleanly or startup fails. Environment variables
//! (`MERIDIAN_*`, `PORT`) override the file and CLI flags override both.
//! `RUST_LOG` takes precedence over the configured log level.

use anyhow::Context;
use clap::Parser;
use meridian::api::{serve, AppState};
use meridian::config::{generate_default_config, Config, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "meridian")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-time location-sharing relay")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with the built map client
    #[arg(long)]
    static_dir: Option<String>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let (mut config, source) = match &cli.config {
        Some(path) => {
            let config = Config::load_with_env(path)
                .with_context(|| format!("loading config from {:?}", path))?;
            (config, Some(path.clone()))
        }
        None => Config::load_default().context("loading default config")?,
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.static_dir {
        config.server.static_dir = Some(dir);
    }

    config.relay.validate().context("invalid relay settings")?;

    init_tracing(&config.logging);

    tracing::info!("Starting Meridian v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }
    tracing::info!(
        max_peers = config.relay.max_peers,
        outbox_capacity = config.relay.outbox_capacity,
        initial_sync = config.relay.initial_sync,
        "Relay configured"
    );

    let state = AppState::new(config.relay.clone());
    serve(state, &config.server).await?;

    tracing::info!("Meridian stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("meridian={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
