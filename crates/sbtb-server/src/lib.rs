//! HTTP trigger surface and runtime wiring for the sbtb pipelines.
//!
//! Exposes an axum [`Router`] that runs either pipeline on demand and reads
//! back the current store state. The binary in `main.rs` builds the concrete
//! pipelines from [`config::AppConfig`].

pub mod config;
pub mod error;
pub mod pipelines;
pub mod records;
pub mod scheduler;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use sbtb_core::store::BoxingStore;
use sbtb_scrape::Pipeline;
use tower_http::trace::TraceLayer;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<R, C, S> {
  pub rankings:    Arc<R>,
  pub fight_cards: Arc<C>,
  pub store:       Arc<S>,
}

impl<R, C, S> Clone for AppState<R, C, S> {
  fn clone(&self) -> Self {
    Self {
      rankings:    Arc::clone(&self.rankings),
      fight_cards: Arc::clone(&self.fight_cards),
      store:       Arc::clone(&self.store),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<R, C, S>(state: AppState<R, C, S>) -> Router
where
  R: Pipeline + 'static,
  C: Pipeline + 'static,
  S: BoxingStore + 'static,
{
  Router::new()
    // Pipelines
    .route("/pipelines/rankings", post(pipelines::rankings::<R, C, S>))
    .route("/pipelines/fight-cards", post(pipelines::fight_cards::<R, C, S>))
    // Store state
    .route("/ranks", get(records::ranks::<R, C, S>))
    .route("/fight-cards", get(records::fight_cards::<R, C, S>))
    .route("/records/{kind}/{id}", delete(records::soft_delete::<R, C, S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
