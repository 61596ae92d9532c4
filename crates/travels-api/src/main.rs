//! travels server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) and `TRAVELS_*`
//! environment variables, loads the dataset archive into an in-memory store,
//! and only then starts serving the JSON API over HTTP. A dataset that fails
//! to load aborts startup.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use travels_api::ServerConfig;
use travels_store_memory::MemoryStore;

#[derive(Parser)]
#[command(author, version, about = "Travels dataset server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Dataset archive (zip file or directory); overrides the configuration.
  #[arg(short, long)]
  archive: Option<PathBuf>,
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
  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to read configuration {:?}", cli.config))?;
  if let Some(archive) = cli.archive {
    server_cfg.archive_path = archive;
  }

  // Load the dataset before accepting any request.
  let store = Arc::new(MemoryStore::new());
  let report = {
    let store = Arc::clone(&store);
    let archive = server_cfg.archive_path.clone();
    tokio::task::spawn_blocking(move || {
      travels_ingest::ingest_archive(&*store, &archive)
    })
    .await
    .context("ingestion task failed")?
    .with_context(|| {
      format!("failed to load archive {:?}", server_cfg.archive_path)
    })?
  };
  tracing::info!(
    members = report.members_loaded,
    skipped = report.members_skipped,
    records = report.records(),
    "dataset ready"
  );

  let app = travels_api::api_router(store).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
