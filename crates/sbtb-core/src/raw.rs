//! Raw records emitted by the page parsers, before any store resolution.
//!
//! Names in these records are as scraped (rankings names are already
//! lower-cased by the parser; schedule names are only trimmed). The
//! reconciler normalises them before lookup.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rank assigned to the second name of a champion/interim split slot.
pub const INTERIM_RANK: f64 = 0.5;

/// One fighter slot (or half of a split slot) on a rankings list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFighterEntry {
  pub name:        String,
  pub rank:        f64,
  pub is_champion: bool,
}

/// Everything scraped for one weight class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDivision {
  /// Upper weight limit read from the division label; `None` for heavyweight.
  pub pounds:        Option<u32>,
  /// Organization label → ordered fighter entries.
  pub organizations: BTreeMap<String, Vec<RawFighterEntry>>,
}

/// Weight-class name → division.
pub type RawRankings = BTreeMap<String, RawDivision>;

/// One event from the schedule page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFightCard {
  pub event_date:         DateTime<Utc>,
  pub title_fighters:     (String, String),
  pub undercard_fighters: Vec<String>,
  pub location:           String,
  pub network:            Option<String>,
}
