//! Read and soft-delete handlers over the current store state.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/ranks`       | Live rank standings |
//! | `GET`    | `/fight-cards` | Live fight cards with participants |
//! | `DELETE` | `/records/{kind}/{id}` | `kind` is `fighter`, `weight_class`, … |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use sbtb_core::{
  model::{EntityKind, FightCard, RankStanding},
  store::BoxingStore,
};
use sbtb_scrape::Pipeline;

use crate::{AppState, error::ApiError};

/// `GET /ranks`
pub async fn ranks<R, C, S>(
  State(state): State<AppState<R, C, S>>,
) -> Result<Json<Vec<RankStanding>>, ApiError>
where
  R: Pipeline,
  C: Pipeline,
  S: BoxingStore,
{
  let standings = state
    .store
    .list_rank_standings()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(standings))
}

/// `GET /fight-cards`
pub async fn fight_cards<R, C, S>(
  State(state): State<AppState<R, C, S>>,
) -> Result<Json<Vec<FightCard>>, ApiError>
where
  R: Pipeline,
  C: Pipeline,
  S: BoxingStore,
{
  let cards = state.store.list_fight_cards().await.map_err(ApiError::store)?;
  Ok(Json(cards))
}

/// `DELETE /records/{kind}/{id}`: 204 on success, 404 if no live row.
pub async fn soft_delete<R, C, S>(
  State(state): State<AppState<R, C, S>>,
  Path((kind, id)): Path<(String, i64)>,
) -> Result<StatusCode, ApiError>
where
  R: Pipeline,
  C: Pipeline,
  S: BoxingStore,
{
  let kind = EntityKind::parse(&kind).map_err(|e| ApiError::BadRequest(e.to_string()))?;
  if state.store.soft_delete(kind, id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("{kind} {id}")))
  }
}
