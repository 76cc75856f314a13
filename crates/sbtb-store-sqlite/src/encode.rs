//! Encoding and decoding helpers between sbtb domain records and the plain
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Rows are first read into
//! `Raw*` structs of owned strings and integers inside the database closure,
//! then decoded into domain records outside it.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use sbtb_core::model::{
  FightCard, FightOrganization, Fighter, OrganizationName, Rank, RankStanding,
  WeightClass, is_title_position,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Column lists ────────────────────────────────────────────────────────────
//
// Each list matches the column order its `Raw*::from_row` reads.

pub const ORGANIZATION_COLS: &str = "id, name, created_at, updated_at, deleted_at";

pub const WEIGHT_CLASS_COLS: &str = "id, name, pounds, kilos, upper_limit, lower_limit, \
   created_at, updated_at, deleted_at";

pub const FIGHTER_COLS: &str =
  "id, name, nickname, age, wins, losses, draws, created_at, updated_at, deleted_at";

pub const RANK_COLS: &str = "id, rank, fighter_id, weight_class_id, organization_id, \
   created_at, updated_at, deleted_at";

pub const FIGHT_CARD_COLS: &str = "id, event_name, location, event_date, network, \
   created_at, updated_at, deleted_at";

// ─── Timestamps shared by every row ──────────────────────────────────────────

pub struct RawStamps {
  pub created_at: String,
  pub updated_at: String,
  pub deleted_at: Option<String>,
}

impl RawStamps {
  fn from_row(row: &Row<'_>, first: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      created_at: row.get(first)?,
      updated_at: row.get(first + 1)?,
      deleted_at: row.get(first + 2)?,
    })
  }

  fn decode(
    &self,
  ) -> Result<(DateTime<Utc>, DateTime<Utc>, Option<DateTime<Utc>>)> {
    Ok((
      decode_dt(&self.created_at)?,
      decode_dt(&self.updated_at)?,
      decode_opt_dt(self.deleted_at.as_deref())?,
    ))
  }
}

// ─── Organizations ───────────────────────────────────────────────────────────

pub struct RawOrganization {
  pub id:     i64,
  pub name:   String,
  pub stamps: RawStamps,
}

impl RawOrganization {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:     row.get(0)?,
      name:   row.get(1)?,
      stamps: RawStamps::from_row(row, 2)?,
    })
  }

  pub fn into_organization(self) -> Result<FightOrganization> {
    let (created_at, updated_at, deleted_at) = self.stamps.decode()?;
    Ok(FightOrganization {
      id: self.id,
      name: OrganizationName::parse(&self.name)?,
      created_at,
      updated_at,
      deleted_at,
    })
  }
}

// ─── Weight classes ──────────────────────────────────────────────────────────

pub struct RawWeightClass {
  pub id:          i64,
  pub name:        String,
  pub pounds:      Option<i64>,
  pub kilos:       Option<i64>,
  pub upper_limit: Option<i64>,
  pub lower_limit: Option<i64>,
  pub stamps:      RawStamps,
}

impl RawWeightClass {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      pounds:      row.get(2)?,
      kilos:       row.get(3)?,
      upper_limit: row.get(4)?,
      lower_limit: row.get(5)?,
      stamps:      RawStamps::from_row(row, 6)?,
    })
  }

  pub fn into_weight_class(self) -> Result<WeightClass> {
    let (created_at, updated_at, deleted_at) = self.stamps.decode()?;
    Ok(WeightClass {
      id: self.id,
      name: self.name,
      pounds: self.pounds,
      kilos: self.kilos,
      upper_limit: self.upper_limit,
      lower_limit: self.lower_limit,
      created_at,
      updated_at,
      deleted_at,
    })
  }
}

// ─── Fighters ────────────────────────────────────────────────────────────────

pub struct RawFighter {
  pub id:       i64,
  pub name:     String,
  pub nickname: Option<String>,
  pub age:      Option<i64>,
  pub wins:     Option<i64>,
  pub losses:   Option<i64>,
  pub draws:    Option<i64>,
  pub stamps:   RawStamps,
}

impl RawFighter {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      name:     row.get(1)?,
      nickname: row.get(2)?,
      age:      row.get(3)?,
      wins:     row.get(4)?,
      losses:   row.get(5)?,
      draws:    row.get(6)?,
      stamps:   RawStamps::from_row(row, 7)?,
    })
  }

  pub fn into_fighter(self) -> Result<Fighter> {
    let (created_at, updated_at, deleted_at) = self.stamps.decode()?;
    Ok(Fighter {
      id: self.id,
      name: self.name,
      nickname: self.nickname,
      age: self.age,
      wins: self.wins,
      losses: self.losses,
      draws: self.draws,
      created_at,
      updated_at,
      deleted_at,
    })
  }
}

// ─── Ranks ───────────────────────────────────────────────────────────────────

pub struct RawRank {
  pub id:              i64,
  pub rank:            f64,
  pub fighter_id:      i64,
  pub weight_class_id: i64,
  pub organization_id: i64,
  pub stamps:          RawStamps,
}

impl RawRank {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      rank:            row.get(1)?,
      fighter_id:      row.get(2)?,
      weight_class_id: row.get(3)?,
      organization_id: row.get(4)?,
      stamps:          RawStamps::from_row(row, 5)?,
    })
  }

  pub fn into_rank(self) -> Result<Rank> {
    let (created_at, updated_at, deleted_at) = self.stamps.decode()?;
    Ok(Rank {
      id: self.id,
      rank: self.rank,
      fighter_id: self.fighter_id,
      weight_class_id: self.weight_class_id,
      organization_id: self.organization_id,
      created_at,
      updated_at,
      deleted_at,
    })
  }
}

/// `rank, fighter name, weight class name, organization name`.
pub struct RawStanding {
  pub rank:              f64,
  pub fighter_name:      String,
  pub weight_class_name: String,
  pub organization_name: String,
}

impl RawStanding {
  pub fn into_standing(self) -> Result<RankStanding> {
    Ok(RankStanding {
      rank:              self.rank,
      fighter_name:      self.fighter_name,
      weight_class_name: self.weight_class_name,
      organization_name: OrganizationName::parse(&self.organization_name)?,
      is_champion:       is_title_position(self.rank),
    })
  }
}

// ─── Fight cards ─────────────────────────────────────────────────────────────

pub struct RawFightCard {
  pub id:         i64,
  pub event_name: String,
  pub location:   String,
  pub event_date: String,
  pub network:    Option<String>,
  pub stamps:     RawStamps,
  /// Participants in association order; filled by a second query.
  pub fighters:   Vec<RawFighter>,
}

impl RawFightCard {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      event_name: row.get(1)?,
      location:   row.get(2)?,
      event_date: row.get(3)?,
      network:    row.get(4)?,
      stamps:     RawStamps::from_row(row, 5)?,
      fighters:   Vec::new(),
    })
  }

  pub fn into_fight_card(self) -> Result<FightCard> {
    let (created_at, updated_at, deleted_at) = self.stamps.decode()?;
    let fighters = self
      .fighters
      .into_iter()
      .map(RawFighter::into_fighter)
      .collect::<Result<_>>()?;
    Ok(FightCard {
      id: self.id,
      event_name: self.event_name,
      location: self.location,
      event_date: decode_dt(&self.event_date)?,
      network: self.network,
      fighters,
      created_at,
      updated_at,
      deleted_at,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn datetime_round_trips_through_rfc3339() {
    let dt = Utc.with_ymd_and_hms(2025, 4, 18, 5, 0, 0).unwrap();
    let encoded = encode_dt(dt);
    assert_eq!(encoded, "2025-04-18T05:00:00+00:00");
    assert_eq!(decode_dt(&encoded).unwrap(), dt);
  }

  #[test]
  fn garbage_datetime_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
