//! Router tests with stub pipelines and an in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode},
  response::Response,
};
use chrono::{TimeZone as _, Utc};
use sbtb_core::{
  model::{NewFightCard, NewRank},
  seed::seed_reference_data,
  store::BoxingStore,
};
use sbtb_scrape::{ParseError, Pipeline, RunError};
use sbtb_store_sqlite::SqliteStore;
use serde_json::Value;
use tower::ServiceExt as _;

use super::*;

/// A pipeline with a fixed outcome.
enum Stub {
  Records(Vec<&'static str>),
  BrokenLayout,
  StoreDown,
}

impl Pipeline for Stub {
  type Record = &'static str;

  async fn run(&self) -> Result<Vec<&'static str>, RunError> {
    match self {
      Stub::Records(records) => Ok(records.clone()),
      Stub::BrokenLayout => Err(RunError::Parse(ParseError::UnpairedSection { index: 3 })),
      Stub::StoreDown => Err(RunError::persistence(std::io::Error::other(
        "database is locked",
      ))),
    }
  }
}

async fn state(rankings: Stub, fight_cards: Stub) -> AppState<Stub, Stub, SqliteStore> {
  AppState {
    rankings:    Arc::new(rankings),
    fight_cards: Arc::new(fight_cards),
    store:       Arc::new(SqliteStore::open_in_memory().await.unwrap()),
  }
}

async fn send(
  state: AppState<Stub, Stub, SqliteStore>,
  method: &str,
  uri: &str,
) -> Response {
  let req = Request::builder()
    .method(method)
    .uri(uri)
    .body(Body::empty())
    .unwrap();
  router(state).oneshot(req).await.unwrap()
}

async fn json(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ── Pipelines ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn triggered_run_returns_records() {
  let state = state(Stub::Records(vec!["a", "b"]), Stub::Records(vec![])).await;
  let resp = send(state, "POST", "/pipelines/rankings").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json(resp).await, serde_json::json!(["a", "b"]));
}

#[tokio::test]
async fn empty_run_is_ok_with_empty_list() {
  let state = state(Stub::Records(vec![]), Stub::Records(vec![])).await;
  let resp = send(state, "POST", "/pipelines/fight-cards").await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json(resp).await, serde_json::json!([]));
}

#[tokio::test]
async fn parse_failure_is_unprocessable() {
  let state = state(Stub::BrokenLayout, Stub::Records(vec![])).await;
  let resp = send(state, "POST", "/pipelines/rankings").await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body = json(resp).await;
  assert!(body["error"].as_str().unwrap().contains("section 3"));
}

#[tokio::test]
async fn persistence_failure_is_server_error() {
  let state = state(Stub::Records(vec![]), Stub::StoreDown).await;
  let resp = send(state, "POST", "/pipelines/fight-cards").await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = json(resp).await;
  assert!(body["error"].as_str().unwrap().contains("database is locked"));
}

#[tokio::test]
async fn pipelines_only_accept_post() {
  let state = state(Stub::Records(vec![]), Stub::Records(vec![])).await;
  let resp = send(state, "GET", "/pipelines/rankings").await;
  assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ── Store state ────────────────────────────────────────────────────────────

#[tokio::test]
async fn ranks_lists_live_standings() {
  let state = state(Stub::Records(vec![]), Stub::Records(vec![])).await;
  let store = state.store.clone();
  seed_reference_data(store.as_ref()).await.unwrap();
  let wc = store.list_weight_classes().await.unwrap().remove(0);
  let org = store.list_organizations().await.unwrap().remove(0);
  let fighter = store.get_or_create_fighter("oleksandr usyk").await.unwrap();
  store
    .upsert_rank(NewRank {
      rank:            0.0,
      fighter_id:      fighter.id,
      weight_class_id: wc.id,
      organization_id: org.id,
    })
    .await
    .unwrap();

  let resp = send(state, "GET", "/ranks").await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json(resp).await;
  assert_eq!(body[0]["fighter_name"], "oleksandr usyk");
  assert_eq!(body[0]["organization_name"], "UFC");
  assert_eq!(body[0]["is_champion"], true);
}

#[tokio::test]
async fn fight_cards_and_soft_delete() {
  let state = state(Stub::Records(vec![]), Stub::Records(vec![])).await;
  let store = state.store.clone();
  let card = store
    .upsert_fight_card(NewFightCard {
      event_name: "fighter a vs fighter b".into(),
      location:   "Las Vegas, NV".into(),
      event_date: Utc.with_ymd_and_hms(2025, 4, 18, 5, 0, 0).unwrap(),
      network:    None,
    })
    .await
    .unwrap();

  let resp = send(state.clone(), "GET", "/fight-cards").await;
  let body = json(resp).await;
  assert_eq!(body.as_array().unwrap().len(), 1);
  assert_eq!(body[0]["event_name"], "fighter a vs fighter b");

  let uri = format!("/records/fight_card/{}", card.id);
  let resp = send(state.clone(), "DELETE", &uri).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(state.clone(), "DELETE", &uri).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let body = json(send(state, "GET", "/fight-cards").await).await;
  assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn soft_delete_rejects_unknown_kind() {
  let state = state(Stub::Records(vec![]), Stub::Records(vec![])).await;
  let resp = send(state, "DELETE", "/records/referee/1").await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
