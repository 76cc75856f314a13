//! sbtb binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and either runs one pipeline and prints its records as JSON
//! (`--once`) or serves the trigger API, optionally with a periodic
//! scheduler.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use sbtb_core::seed::seed_reference_data;
use sbtb_scrape::{
  FightCardPipeline, Pipeline, RankingsPipeline,
  fetch::{BrowserFetcher, HttpFetcher},
  scraper::{FightCardScraper, RankingsScraper},
};
use sbtb_server::{AppState, config::AppConfig, scheduler};
use sbtb_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Boxing rankings and fight-card pipeline")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create the fight organizations and standard weight classes first.
  #[arg(long)]
  seed: bool,

  /// Run one pipeline, print its records as JSON and exit.
  #[arg(long, value_enum)]
  once: Option<PipelineKind>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PipelineKind {
  Rankings,
  FightCards,
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

  let config = AppConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.seed {
    seed_reference_data(&store)
      .await
      .context("failed to seed reference data")?;
  }

  let http = HttpFetcher::new(config.http_fetch_config())
    .context("failed to build HTTP fetcher")?;
  let browser = BrowserFetcher::new(config.browser_config());

  let rankings = Arc::new(RankingsPipeline::new(
    RankingsScraper::new(http, config.scrape.rankings_url.clone()),
    store.clone(),
  ));
  let fight_cards = Arc::new(FightCardPipeline::new(
    FightCardScraper::new(
      browser,
      config.scrape.schedule_url.clone(),
      config.scrape.source_timezone,
    ),
    store.clone(),
  ));

  match cli.once {
    Some(PipelineKind::Rankings) => return print_run(rankings.as_ref()).await,
    Some(PipelineKind::FightCards) => return print_run(fight_cards.as_ref()).await,
    None => {}
  }

  if let Some(interval) = config.schedule_interval() {
    tokio::spawn(scheduler::run_every(
      interval,
      Arc::clone(&rankings),
      Arc::clone(&fight_cards),
    ));
  }

  let state = AppState { rankings, fight_cards, store: Arc::new(store) };
  let app = sbtb_server::router(state);
  let address = format!("{}:{}", config.server.host, config.server.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn print_run<P: Pipeline>(pipeline: &P) -> anyhow::Result<()> {
  let records = pipeline.run().await.context("pipeline run failed")?;
  println!(
    "{}",
    serde_json::to_string_pretty(&records).context("serialising records")?
  );
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
