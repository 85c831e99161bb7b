//! `sharelist`: an interactive shell over a shared shopping-list store.
//!
//! Reads `sharelist.toml` (or the path given with `--config`), opens the
//! SQLite store, and reads commands from stdin until `quit` or end of input.
//! Type `help` for the command list.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use sharelist_app::{App, AppConfig, shell};
use sharelist_store_sqlite::SqliteStore;
use tokio::io::BufReader;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Shared shopping lists")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "sharelist.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path` from the configuration.
  #[arg(long, value_name = "PATH")]
  store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so they never interleave with shell replies.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut config = AppConfig::load(Some(&cli.config))
    .with_context(|| format!("failed to read configuration from {}", cli.config.display()))?;
  if let Some(store) = cli.store {
    config.store_path = store;
  }

  let store_path = config.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = %store_path.display(), "opened store");

  let app = App::new(Arc::new(store), &config).context("failed to configure password hashing")?;

  shell::run(&app, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    .await
    .context("shell i/o failed")?;

  Ok(())
}
