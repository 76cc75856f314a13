//! The `BoxingStore` trait, the persistence boundary of the pipeline.
//!
//! The trait is implemented by storage backends (e.g. `sbtb-store-sqlite`).
//! The reconciler and the HTTP layer depend on this abstraction, not on any
//! concrete backend.
//!
//! Every write is keyed on a natural identity (a name, an event name, or the
//! `(rank, weight_class_id, organization_id)` triple). A write that collides
//! with an existing row updates that row instead of failing, so repeated runs
//! against the same source never grow the tables.
//!
//! Read paths never return soft-deleted rows. Writes that land on a
//! soft-deleted natural key revive the row.

use std::future::Future;

use crate::model::{
  EntityKind, FightCard, FightOrganization, Fighter, NewFightCard, NewFighter,
  NewRank, NewWeightClass, OrganizationName, Rank, RankStanding, WeightClass,
};

/// Abstraction over a sbtb store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BoxingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organizations ─────────────────────────────────────────────────────

  fn list_organizations(
    &self,
  ) -> impl Future<Output = Result<Vec<FightOrganization>, Self::Error>> + Send + '_;

  fn get_or_create_organization(
    &self,
    name: OrganizationName,
  ) -> impl Future<Output = Result<FightOrganization, Self::Error>> + Send + '_;

  // ── Weight classes ────────────────────────────────────────────────────

  fn list_weight_classes(
    &self,
  ) -> impl Future<Output = Result<Vec<WeightClass>, Self::Error>> + Send + '_;

  /// Match on the lower-cased name; overwrite every other field.
  fn upsert_weight_class(
    &self,
    input: NewWeightClass,
  ) -> impl Future<Output = Result<WeightClass, Self::Error>> + Send + '_;

  // ── Fighters ──────────────────────────────────────────────────────────

  /// Case-insensitive lookup by name. Returns `None` if not found.
  fn get_fighter_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Fighter>, Self::Error>> + Send + 'a;

  fn list_fighters(
    &self,
  ) -> impl Future<Output = Result<Vec<Fighter>, Self::Error>> + Send + '_;

  /// Return the fighter with this (normalised) name, creating it if absent.
  /// Existing attributes are left untouched.
  fn get_or_create_fighter<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Fighter, Self::Error>> + Send + 'a;

  /// Match on the normalised name; overwrite every non-key field.
  fn upsert_fighter(
    &self,
    input: NewFighter,
  ) -> impl Future<Output = Result<Fighter, Self::Error>> + Send + '_;

  /// Batched [`BoxingStore::upsert_fighter`]: same key, same overwrite
  /// policy, one unit of work. Returns rows in input order.
  fn bulk_upsert_fighters(
    &self,
    inputs: Vec<NewFighter>,
  ) -> impl Future<Output = Result<Vec<Fighter>, Self::Error>> + Send + '_;

  // ── Ranks ─────────────────────────────────────────────────────────────

  /// Match on `(rank, weight_class_id, organization_id)`; a hit only
  /// changes the fighter.
  fn upsert_rank(
    &self,
    input: NewRank,
  ) -> impl Future<Output = Result<Rank, Self::Error>> + Send + '_;

  /// Batched [`BoxingStore::upsert_rank`]. When the batch repeats a triple,
  /// the later entry wins, exactly as with sequential upserts.
  fn bulk_upsert_ranks(
    &self,
    inputs: Vec<NewRank>,
  ) -> impl Future<Output = Result<Vec<Rank>, Self::Error>> + Send + '_;

  /// Every live rank joined with its fighter, weight class and organization.
  fn list_rank_standings(
    &self,
  ) -> impl Future<Output = Result<Vec<RankStanding>, Self::Error>> + Send + '_;

  // ── Fight cards ───────────────────────────────────────────────────────

  fn get_fight_card_by_event<'a>(
    &'a self,
    event_name: &'a str,
  ) -> impl Future<Output = Result<Option<FightCard>, Self::Error>> + Send + 'a;

  fn list_fight_cards(
    &self,
  ) -> impl Future<Output = Result<Vec<FightCard>, Self::Error>> + Send + '_;

  /// Return the card with this event name, creating it from `input` if
  /// absent. Existing attributes are left untouched.
  fn get_or_create_fight_card(
    &self,
    input: NewFightCard,
  ) -> impl Future<Output = Result<FightCard, Self::Error>> + Send + '_;

  /// Match on `event_name`; overwrite location, date and network.
  /// Participants are not touched.
  fn upsert_fight_card(
    &self,
    input: NewFightCard,
  ) -> impl Future<Output = Result<FightCard, Self::Error>> + Send + '_;

  /// Replace the card's participant set wholesale with `fighter_ids`
  /// (in that order) and return the refreshed card.
  fn replace_fight_card_fighters<'a>(
    &'a self,
    card_id: i64,
    fighter_ids: &'a [i64],
  ) -> impl Future<Output = Result<FightCard, Self::Error>> + Send + 'a;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Stamp `deleted_at` on a row. Returns `false` if no live row matched.
  fn soft_delete(
    &self,
    kind: EntityKind,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
