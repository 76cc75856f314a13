//! The `Scraper` capability: fetch a page, then parse it.

use std::future::Future;

use chrono_tz::Tz;
use tracing::error;

use sbtb_core::raw::{RawFightCard, RawRankings};

use crate::{
  error::ParseError,
  fetch::{FetchError, Fetcher},
  rankings::parse_rankings,
  schedule::parse_schedule,
};

/// A source page bound to its fetch strategy and its parser.
pub trait Scraper: Send + Sync {
  type Output: Send;

  fn fetch(&self) -> impl Future<Output = Result<String, FetchError>> + Send + '_;

  fn parse(&self, markup: &str) -> Result<Self::Output, ParseError>;

  /// Fetch then parse. A fetch failure is logged and yields `None`; a parse
  /// failure is returned.
  fn run(
    &self,
  ) -> impl Future<Output = Result<Option<Self::Output>, ParseError>> + Send + '_ {
    async move {
      match self.fetch().await {
        Ok(markup) => self.parse(&markup).map(Some),
        Err(e) => {
          error!(error = %e, "fetch failed; nothing to parse");
          Ok(None)
        }
      }
    }
  }
}

// ─── Rankings ────────────────────────────────────────────────────────────────

pub struct RankingsScraper<F> {
  fetcher: F,
  url:     String,
}

impl<F: Fetcher> RankingsScraper<F> {
  pub fn new(fetcher: F, url: impl Into<String>) -> Self {
    Self { fetcher, url: url.into() }
  }
}

impl<F: Fetcher> Scraper for RankingsScraper<F> {
  type Output = RawRankings;

  async fn fetch(&self) -> Result<String, FetchError> {
    self.fetcher.fetch(&self.url).await
  }

  fn parse(&self, markup: &str) -> Result<RawRankings, ParseError> {
    parse_rankings(markup)
  }
}

// ─── Fight cards ─────────────────────────────────────────────────────────────

pub struct FightCardScraper<F> {
  fetcher: F,
  url:     String,
  /// Zone the schedule page prints its times in.
  zone:    Tz,
}

impl<F: Fetcher> FightCardScraper<F> {
  pub fn new(fetcher: F, url: impl Into<String>, zone: Tz) -> Self {
    Self { fetcher, url: url.into(), zone }
  }
}

impl<F: Fetcher> Scraper for FightCardScraper<F> {
  type Output = Vec<RawFightCard>;

  async fn fetch(&self) -> Result<String, FetchError> {
    self.fetcher.fetch(&self.url).await
  }

  fn parse(&self, markup: &str) -> Result<Vec<RawFightCard>, ParseError> {
    parse_schedule(markup, self.zone)
  }
}
