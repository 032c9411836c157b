use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostpulse::config::{self, Config};
use hostpulse::metrics::{SamplingEngine, SysinfoSource};
use hostpulse::server::{AppState, router};

#[derive(Parser)]
#[command(
    name = "hostpulse",
    about = "Host metrics daemon with an HTTP snapshot API"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides the config file
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostpulse=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    let source = SysinfoSource::new(config.sampling.disk_path.clone());
    let engine = SamplingEngine::new(source)?;
    let app = router(AppState::new(engine));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };

    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config
}
