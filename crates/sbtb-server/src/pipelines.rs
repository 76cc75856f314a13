//! Handlers that trigger pipeline runs.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/pipelines/rankings`    | Returns the merged rank standings |
//! | `POST` | `/pipelines/fight-cards` | Returns the saved fight cards |
//!
//! A run whose fetch failed answers `200` with an empty list.

use axum::{Json, extract::State};
use sbtb_core::store::BoxingStore;
use sbtb_scrape::Pipeline;
use tracing::info;

use crate::{AppState, error::ApiError};

async fn run<P: Pipeline>(name: &'static str, pipeline: &P) -> Result<Json<Vec<P::Record>>, ApiError> {
  let records = pipeline.run().await?;
  info!(pipeline = name, records = records.len(), "triggered run finished");
  Ok(Json(records))
}

/// `POST /pipelines/rankings`
pub async fn rankings<R, C, S>(
  State(state): State<AppState<R, C, S>>,
) -> Result<Json<Vec<R::Record>>, ApiError>
where
  R: Pipeline,
  C: Pipeline,
  S: BoxingStore,
{
  run("rankings", state.rankings.as_ref()).await
}

/// `POST /pipelines/fight-cards`
pub async fn fight_cards<R, C, S>(
  State(state): State<AppState<R, C, S>>,
) -> Result<Json<Vec<C::Record>>, ApiError>
where
  R: Pipeline,
  C: Pipeline,
  S: BoxingStore,
{
  run("fight-cards", state.fight_cards.as_ref()).await
}
