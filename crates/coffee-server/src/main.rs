//! coffee-server binary.
//!
//! Reads `config.yml` (or the path given with `--config`), builds the
//! document store client, and serves the JSON API over HTTP.
//!
//! # Checking a configuration
//!
//! ```text
//! cargo run -p coffee-server -- --config config.yml --check-config
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use coffee_core::Records;
use coffee_server::{Backend, Settings};
use coffee_store_appwrite::AppwriteStore;
use coffee_store_memory::MemoryStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.yml";

#[derive(Parser)]
#[command(author, version, about = "Coffee Counter API server")]
struct Cli {
  /// Path to the YAML configuration file. Defaults to `config.yml`, which
  /// may be absent when the environment supplies every setting.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Load and validate the configuration, print a summary, and exit.
  #[arg(long)]
  check_config: bool,
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

  let required = cli.config.is_some();
  let path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
  let settings = Settings::load(&path, required)
    .with_context(|| format!("failed to load configuration from {}", path.display()))?;

  if cli.check_config {
    println!("{}", settings.summary());
    return Ok(());
  }

  let collections = settings.collections();
  let app = match settings.backend {
    Backend::Appwrite => {
      let store = AppwriteStore::new(settings.appwrite_config())
        .context("failed to build Appwrite client")?;
      tracing::info!(endpoint = %settings.appwrite.api_endpoint, "using Appwrite backend");
      coffee_server::app(Arc::new(Records::new(Arc::new(store), collections)))
    }
    Backend::Memory => {
      tracing::warn!("using in-memory backend; documents are lost on exit");
      let store = MemoryStore::with_permissions(settings.permissions());
      coffee_server::app(Arc::new(Records::new(Arc::new(store), collections)))
    }
  };

  let address = settings.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
