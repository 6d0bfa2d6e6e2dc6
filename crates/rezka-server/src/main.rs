//! rezka-server - HTTP bridge in front of the HDRezka catalog
//!
//! Exposes `GET /fetch_stream?title=&season=&episode=`: searches the
//! catalog, picks a translator, resolves the stream with one CDN request,
//! and returns quality → HLS manifest URLs.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;

use config::ServerConfig;
use routes::AppState;

/// HDRezka stream resolution API
#[derive(Parser)]
#[command(name = "rezka-server")]
#[command(version)]
#[command(about = "HTTP bridge exposing HDRezka stream resolution", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address override
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rezka_core=debug,rezka_server=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let state = Arc::new(AppState::new(&config)?);
    let app = routes::router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, version = rezka_core::VERSION, "rezka-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
