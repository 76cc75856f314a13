//! Domain records: one canonical type per persisted entity.
//!
//! These structs are what the store returns, what the reconciler works with,
//! and what the HTTP layer serialises. Column encoding lives exclusively in
//! the storage backend.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Names ───────────────────────────────────────────────────────────────────

/// Canonical form of a fighter or weight-class name: trimmed and lower-cased.
///
/// Every name lookup and every name write goes through this function, which
/// is what makes name identity case-insensitive.
pub fn normalize_name(raw: &str) -> String { raw.trim().to_lowercase() }

// ─── Organizations ───────────────────────────────────────────────────────────

/// The closed set of sanctioning bodies a rank can belong to.
///
/// The textual form is the upper-case acronym; parsing is case-sensitive.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OrganizationName {
  Ufc,
  Wbo,
  Wbc,
  Ibf,
  Wba,
}

impl OrganizationName {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Case-sensitive match against the enumeration values.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownOrganization(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightOrganization {
  pub id:         i64,
  pub name:       OrganizationName,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

// ─── Weight classes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightClass {
  pub id:          i64,
  pub name:        String,
  pub pounds:      Option<i64>,
  pub kilos:       Option<i64>,
  /// `None` for the open class (heavyweight).
  pub upper_limit: Option<i64>,
  pub lower_limit: Option<i64>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub deleted_at:  Option<DateTime<Utc>>,
}

/// Input to [`crate::store::BoxingStore::upsert_weight_class`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWeightClass {
  pub name:        String,
  pub pounds:      Option<i64>,
  pub kilos:       Option<i64>,
  pub upper_limit: Option<i64>,
  pub lower_limit: Option<i64>,
}

// ─── Fighters ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
  pub id:         i64,
  /// Always stored in [`normalize_name`] form.
  pub name:       String,
  pub nickname:   Option<String>,
  pub age:        Option<i64>,
  pub wins:       Option<i64>,
  pub losses:     Option<i64>,
  pub draws:      Option<i64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

/// Input to the fighter upsert operations. Every non-key field is written on
/// upsert, so `None` clears a previously stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFighter {
  pub name:     String,
  pub nickname: Option<String>,
  pub age:      Option<i64>,
  pub wins:     Option<i64>,
  pub losses:   Option<i64>,
  pub draws:    Option<i64>,
}

impl NewFighter {
  /// A fighter known only by name.
  pub fn named(name: &str) -> Self {
    Self { name: normalize_name(name), ..Self::default() }
  }
}

// ─── Ranks ───────────────────────────────────────────────────────────────────

/// "Fighter X holds position `rank` in a weight class under an organization."
///
/// Unique per `(rank, weight_class_id, organization_id)`. The rank is a float
/// so an interim champion can sit at `0.5`, next to the champion at `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
  pub id:              i64,
  pub rank:            f64,
  pub fighter_id:      i64,
  pub weight_class_id: i64,
  pub organization_id: i64,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  pub deleted_at:      Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRank {
  pub rank:            f64,
  pub fighter_id:      i64,
  pub weight_class_id: i64,
  pub organization_id: i64,
}

/// Flattened, human-readable view of a rank row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankStanding {
  pub rank:              f64,
  pub fighter_name:      String,
  pub weight_class_name: String,
  pub organization_name: OrganizationName,
  pub is_champion:       bool,
}

/// Rank positions below `1.0` are title holders (champion and interim).
pub fn is_title_position(rank: f64) -> bool { rank < 1.0 }

// ─── Fight cards ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightCard {
  pub id:         i64,
  /// `"<fighter a> vs <fighter b>"`, derived from the title bout.
  pub event_name: String,
  pub location:   String,
  pub event_date: DateTime<Utc>,
  pub network:    Option<String>,
  /// Title participants first, then the undercard, in encounter order.
  pub fighters:   Vec<Fighter>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFightCard {
  pub event_name: String,
  pub location:   String,
  pub event_date: DateTime<Utc>,
  pub network:    Option<String>,
}

/// Build the natural key of a fight card from its title bout.
pub fn event_name(fighter_a: &str, fighter_b: &str) -> String {
  format!("{fighter_a} vs {fighter_b}")
}

// ─── Soft deletion ───────────────────────────────────────────────────────────

/// Which table a [`crate::store::BoxingStore::soft_delete`] call targets.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Fighter,
  FightOrganization,
  WeightClass,
  Rank,
  FightCard,
}

impl EntityKind {
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownEntityKind(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn organization_parse_is_case_sensitive() {
    assert_eq!(OrganizationName::parse("WBC").unwrap(), OrganizationName::Wbc);
    assert!(matches!(
      OrganizationName::parse("wbc"),
      Err(Error::UnknownOrganization(_))
    ));
    assert!(OrganizationName::parse("IBO").is_err());
  }

  #[test]
  fn organization_text_form_is_acronym() {
    assert_eq!(OrganizationName::Ufc.to_string(), "UFC");
    assert_eq!(OrganizationName::Wba.as_str(), "WBA");
    assert_eq!(
      serde_json::to_string(&OrganizationName::Ibf).unwrap(),
      "\"IBF\""
    );
  }

  #[test]
  fn names_normalize_to_trimmed_lowercase() {
    assert_eq!(normalize_name("  Oleksandr USYK "), "oleksandr usyk");
    assert_eq!(NewFighter::named("Canelo Alvarez").name, "canelo alvarez");
  }

  #[test]
  fn event_name_joins_title_fighters() {
    assert_eq!(event_name("fighter a", "fighter b"), "fighter a vs fighter b");
  }

  #[test]
  fn entity_kind_round_trips_through_text() {
    assert_eq!(EntityKind::FightCard.to_string(), "fight_card");
    assert_eq!(EntityKind::parse("weight_class").unwrap(), EntityKind::WeightClass);
    assert!(EntityKind::parse("referee").is_err());
  }
}
