//! census-server binary.
//!
//! Reads `census.toml` (or the path specified with `--config`), overlays
//! `CENSUS_*` environment variables, opens the SQLite store, refreshes the
//! statistics snapshot, and serves the JSON API under `/api`.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use census_api::api_router;
use census_core::store::CitizenStore as _;
use census_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Census registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "census.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = ::config::Config::builder()
    .add_source(::config::File::from(cli.config).required(false))
    .add_source(::config::Environment::with_prefix("CENSUS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store; bootstraps missing tables.
  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let snapshot = store
    .recompute_statistics()
    .await
    .context("failed to compute initial statistics")?;
  tracing::info!(last_updated = %snapshot.last_updated, "statistics ready");

  let app = Router::new()
    .nest("/api", api_router(Arc::new(store), server_cfg.api_config()))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
