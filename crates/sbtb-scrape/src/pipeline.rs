//! End-to-end runs: scrape, reconcile, persist.
//!
//! Every run gets a fresh id that tags all of its log lines. A fetch failure
//! ends the run with an empty result; parse and persistence failures are
//! returned as [`RunError`].

use std::future::Future;

use serde::Serialize;
use tracing::{Instrument as _, info, info_span};
use uuid::Uuid;

use sbtb_core::{
  model::{FightCard, RankStanding},
  reconcile::Reconciler,
  store::BoxingStore,
};

use crate::{
  error::RunError,
  fetch::Fetcher,
  scraper::{FightCardScraper, RankingsScraper, Scraper},
};

/// One runnable pipeline, as exposed to the trigger surface.
pub trait Pipeline: Send + Sync {
  type Record: Serialize + Send;

  fn run(&self) -> impl Future<Output = Result<Vec<Self::Record>, RunError>> + Send + '_;
}

// ─── Rankings ────────────────────────────────────────────────────────────────

pub struct RankingsPipeline<F, S> {
  scraper: RankingsScraper<F>,
  store:   S,
}

impl<F: Fetcher, S: BoxingStore> RankingsPipeline<F, S> {
  pub fn new(scraper: RankingsScraper<F>, store: S) -> Self { Self { scraper, store } }
}

impl<F: Fetcher, S: BoxingStore> Pipeline for RankingsPipeline<F, S> {
  type Record = RankStanding;

  async fn run(&self) -> Result<Vec<RankStanding>, RunError> {
    let run_id = Uuid::new_v4();
    async move {
      info!("starting rankings run");
      let Some(rankings) = self.scraper.run().await? else {
        return Ok(Vec::new());
      };

      let outcome = Reconciler::new(&self.store)
        .reconcile_rankings(&rankings)
        .await
        .map_err(RunError::persistence)?;

      info!(
        divisions = rankings.len(),
        ranks = outcome.standings.len(),
        skipped = outcome.skipped,
        "rankings run finished"
      );
      Ok(outcome.standings)
    }
    .instrument(info_span!("rankings_run", %run_id))
    .await
  }
}

// ─── Fight cards ─────────────────────────────────────────────────────────────

pub struct FightCardPipeline<F, S> {
  scraper: FightCardScraper<F>,
  store:   S,
}

impl<F: Fetcher, S: BoxingStore> FightCardPipeline<F, S> {
  pub fn new(scraper: FightCardScraper<F>, store: S) -> Self { Self { scraper, store } }
}

impl<F: Fetcher, S: BoxingStore> Pipeline for FightCardPipeline<F, S> {
  type Record = FightCard;

  async fn run(&self) -> Result<Vec<FightCard>, RunError> {
    let run_id = Uuid::new_v4();
    async move {
      info!("starting fight-card run");
      let Some(cards) = self.scraper.run().await? else {
        return Ok(Vec::new());
      };

      let saved = Reconciler::new(&self.store)
        .reconcile_fight_cards(&cards)
        .await
        .map_err(RunError::persistence)?;

      info!(cards = saved.len(), "fight-card run finished");
      Ok(saved)
    }
    .instrument(info_span!("fight_card_run", %run_id))
    .await
  }
}

#[cfg(test)]
mod tests {
  use chrono_tz::Tz;
  use sbtb_core::seed::seed_reference_data;
  use sbtb_store_sqlite::SqliteStore;

  use super::*;
  use crate::{error::ParseError, fetch::FetchError};

  /// Serves one canned page, or fails every fetch.
  struct CannedFetcher(Option<&'static str>);

  impl Fetcher for CannedFetcher {
    async fn fetch(&self, _target: &str) -> Result<String, FetchError> {
      self
        .0
        .map(str::to_owned)
        .ok_or(FetchError::HttpFailure { status: 503, body: String::new() })
    }
  }

  const RANKINGS: &str = include_str!("../fixtures/rankings.html");
  const SCHEDULE: &str = include_str!("../fixtures/schedule.html");

  async fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    seed_reference_data(&store).await.unwrap();
    store
  }

  fn rankings_pipeline(
    page: Option<&'static str>,
    store: SqliteStore,
  ) -> RankingsPipeline<CannedFetcher, SqliteStore> {
    RankingsPipeline::new(RankingsScraper::new(CannedFetcher(page), "rankings"), store)
  }

  #[tokio::test]
  async fn rankings_run_persists_every_entry() {
    let store = seeded().await;
    let pipeline = rankings_pipeline(Some(RANKINGS), store.clone());

    let standings = pipeline.run().await.unwrap();
    assert_eq!(standings.len(), 9);

    let parker = standings
      .iter()
      .find(|s| s.fighter_name == "joseph parker")
      .unwrap();
    assert_eq!(parker.rank, 0.5);
    assert!(parker.is_champion);
    assert_eq!(parker.weight_class_name, "heavyweight");

    assert_eq!(store.list_rank_standings().await.unwrap().len(), 9);
  }

  #[tokio::test]
  async fn rankings_rerun_is_idempotent() {
    let store = seeded().await;
    let pipeline = rankings_pipeline(Some(RANKINGS), store.clone());

    pipeline.run().await.unwrap();
    pipeline.run().await.unwrap();

    assert_eq!(store.list_rank_standings().await.unwrap().len(), 9);
    assert_eq!(store.list_fighters().await.unwrap().len(), 9);
  }

  #[tokio::test]
  async fn fetch_failure_yields_empty_result() {
    let store = seeded().await;
    let standings = rankings_pipeline(None, store.clone()).run().await.unwrap();
    assert!(standings.is_empty());
    assert!(store.list_fighters().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn parse_failure_aborts_without_writes() {
    let store = seeded().await;
    let err = rankings_pipeline(Some("<html><body>redesigned</body></html>"), store.clone())
      .run()
      .await
      .unwrap_err();

    assert!(matches!(err, RunError::Parse(ParseError::MissingElement { .. })));
    assert!(store.list_fighters().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn fight_card_run_links_title_and_undercard() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let pipeline = FightCardPipeline::new(
      FightCardScraper::new(CannedFetcher(Some(SCHEDULE)), "schedule", Tz::EST),
      store.clone(),
    );

    let cards = pipeline.run().await.unwrap();
    assert_eq!(cards.len(), 2);

    let card = &cards[0];
    assert_eq!(card.event_name, "fighter a vs fighter b");
    assert_eq!(card.event_date.to_rfc3339(), "2025-04-18T05:00:00+00:00");
    assert_eq!(card.fighters.len(), 4);

    pipeline.run().await.unwrap();
    assert_eq!(store.list_fight_cards().await.unwrap().len(), 2);
  }
}
