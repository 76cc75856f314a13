//! Scraping side of the sbtb pipeline: fetching pages, parsing them into
//! [`sbtb_core::raw`] records and driving whole runs through the reconciler.

pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod rankings;
pub mod schedule;
pub mod scraper;

pub use error::{ParseError, RunError};
pub use pipeline::{FightCardPipeline, Pipeline, RankingsPipeline};
