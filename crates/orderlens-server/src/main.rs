//! orderlens-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `ORDERLENS_*`
//! environment variables, loads the JSON dataset, and serves the orders API.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use orderlens_server::{AppState, ServerConfig, dataset::Dataset};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fixture-backed orders API")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ORDERLENS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let dataset = Dataset::load(&server_cfg.dataset_path)
    .with_context(|| format!("failed to load dataset {:?}", server_cfg.dataset_path))?;
  tracing::info!(customers = dataset.customer_count(), "dataset loaded");

  let app = orderlens_server::router(AppState::new(dataset, server_cfg.api_token.as_str()));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
