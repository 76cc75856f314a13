//! [`SqliteStore`], the SQLite implementation of [`BoxingStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;

use sbtb_core::{
  model::{
    EntityKind, FightCard, FightOrganization, Fighter, NewFightCard,
    NewFighter, NewRank, NewWeightClass, OrganizationName, Rank, RankStanding,
    WeightClass, normalize_name,
  },
  store::BoxingStore,
};

use crate::{
  Error, Result,
  encode::{
    FIGHT_CARD_COLS, FIGHTER_COLS, ORGANIZATION_COLS, RANK_COLS, RawFightCard,
    RawFighter, RawOrganization, RawRank, RawStanding, RawWeightClass,
    WEIGHT_CLASS_COLS, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Statements ──────────────────────────────────────────────────────────────
//
// Every natural-key write is a single upsert statement. A conflicting insert
// turns into an update, which also clears `deleted_at` so a soft-deleted row
// is revived rather than duplicated.

fn get_or_create_fighter_sql() -> String {
  format!(
    "INSERT INTO fighters (name, created_at, updated_at) VALUES (?1, ?2, ?2)
     ON CONFLICT(name) DO UPDATE SET
       updated_at = CASE WHEN deleted_at IS NULL THEN updated_at ELSE excluded.updated_at END,
       deleted_at = NULL
     RETURNING {FIGHTER_COLS}"
  )
}

fn upsert_fighter_sql() -> String {
  format!(
    "INSERT INTO fighters (name, nickname, age, wins, losses, draws, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
     ON CONFLICT(name) DO UPDATE SET
       nickname   = excluded.nickname,
       age        = excluded.age,
       wins       = excluded.wins,
       losses     = excluded.losses,
       draws      = excluded.draws,
       updated_at = excluded.updated_at,
       deleted_at = NULL
     RETURNING {FIGHTER_COLS}"
  )
}

fn upsert_rank_sql() -> String {
  format!(
    "INSERT INTO ranks (rank, fighter_id, weight_class_id, organization_id, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?5)
     ON CONFLICT(rank, weight_class_id, organization_id) DO UPDATE SET
       fighter_id = excluded.fighter_id,
       updated_at = excluded.updated_at,
       deleted_at = NULL
     RETURNING {RANK_COLS}"
  )
}

const CARD_FIGHTERS_SQL: &str = "
  SELECT f.id, f.name, f.nickname, f.age, f.wins, f.losses, f.draws,
         f.created_at, f.updated_at, f.deleted_at
  FROM fight_card_fighters cf
  JOIN fighters f ON f.id = cf.fighter_id
  WHERE cf.fight_card_id = ?1
    AND f.deleted_at IS NULL
  ORDER BY cf.position";

/// Attach the live participants to a card row read in the same closure.
fn with_fighters(
  conn: &Connection,
  mut card: RawFightCard,
) -> rusqlite::Result<RawFightCard> {
  let mut stmt = conn.prepare_cached(CARD_FIGHTERS_SQL)?;
  card.fighters = stmt
    .query_map(rusqlite::params![card.id], RawFighter::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(card)
}

fn table_for(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Fighter => "fighters",
    EntityKind::FightOrganization => "fight_organizations",
    EntityKind::WeightClass => "weight_classes",
    EntityKind::Rank => "ranks",
    EntityKind::FightCard => "fight_cards",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sbtb store backed by a single SQLite file.
///
/// Cloning shares the inner reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read one live card with its participants. Returns `None` if absent.
  async fn load_fight_card(&self, card_id: i64) -> Result<Option<FightCard>> {
    let raw: Option<RawFightCard> = self
      .conn
      .call(move |conn| {
        let card = conn
          .query_row(
            &format!(
              "SELECT {FIGHT_CARD_COLS} FROM fight_cards
               WHERE id = ?1 AND deleted_at IS NULL"
            ),
            rusqlite::params![card_id],
            RawFightCard::from_row,
          )
          .optional()?;
        Ok(card.map(|c| with_fighters(conn, c)).transpose()?)
      })
      .await?;

    raw.map(RawFightCard::into_fight_card).transpose()
  }

  /// Shared body of the two fight-card writes; `sql` decides what a
  /// conflict overwrites.
  async fn write_fight_card(
    &self,
    sql: String,
    input: NewFightCard,
  ) -> Result<FightCard> {
    let now = encode_dt(Utc::now());
    let event_date = encode_dt(input.event_date);

    let raw: RawFightCard = self
      .conn
      .call(move |conn| {
        let card = conn.query_row(
          &sql,
          rusqlite::params![
            input.event_name,
            input.location,
            event_date,
            input.network,
            now,
          ],
          RawFightCard::from_row,
        )?;
        Ok(with_fighters(conn, card)?)
      })
      .await?;

    raw.into_fight_card()
  }
}

// ─── BoxingStore impl ────────────────────────────────────────────────────────

impl BoxingStore for SqliteStore {
  type Error = Error;

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn list_organizations(&self) -> Result<Vec<FightOrganization>> {
    let raws: Vec<RawOrganization> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ORGANIZATION_COLS} FROM fight_organizations
           WHERE deleted_at IS NULL ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], RawOrganization::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrganization::into_organization).collect()
  }

  async fn get_or_create_organization(
    &self,
    name: OrganizationName,
  ) -> Result<FightOrganization> {
    let name_str = name.as_str();
    let now = encode_dt(Utc::now());

    let raw: RawOrganization = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO fight_organizations (name, created_at, updated_at)
             VALUES (?1, ?2, ?2)
             ON CONFLICT(name) DO UPDATE SET
               updated_at = CASE WHEN deleted_at IS NULL THEN updated_at ELSE excluded.updated_at END,
               deleted_at = NULL
             RETURNING {ORGANIZATION_COLS}"
          ),
          rusqlite::params![name_str, now],
          RawOrganization::from_row,
        )?)
      })
      .await?;

    raw.into_organization()
  }

  // ── Weight classes ────────────────────────────────────────────────────────

  async fn list_weight_classes(&self) -> Result<Vec<WeightClass>> {
    let raws: Vec<RawWeightClass> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {WEIGHT_CLASS_COLS} FROM weight_classes
           WHERE deleted_at IS NULL ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], RawWeightClass::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWeightClass::into_weight_class).collect()
  }

  async fn upsert_weight_class(&self, input: NewWeightClass) -> Result<WeightClass> {
    let name = normalize_name(&input.name);
    let now = encode_dt(Utc::now());

    let raw: RawWeightClass = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO weight_classes
               (name, pounds, kilos, upper_limit, lower_limit, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(name) DO UPDATE SET
               pounds      = excluded.pounds,
               kilos       = excluded.kilos,
               upper_limit = excluded.upper_limit,
               lower_limit = excluded.lower_limit,
               updated_at  = excluded.updated_at,
               deleted_at  = NULL
             RETURNING {WEIGHT_CLASS_COLS}"
          ),
          rusqlite::params![
            name,
            input.pounds,
            input.kilos,
            input.upper_limit,
            input.lower_limit,
            now,
          ],
          RawWeightClass::from_row,
        )?)
      })
      .await?;

    raw.into_weight_class()
  }

  // ── Fighters ──────────────────────────────────────────────────────────────

  async fn get_fighter_by_name(&self, name: &str) -> Result<Option<Fighter>> {
    let name = normalize_name(name);

    let raw: Option<RawFighter> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FIGHTER_COLS} FROM fighters
                 WHERE name = ?1 AND deleted_at IS NULL"
              ),
              rusqlite::params![name],
              RawFighter::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFighter::into_fighter).transpose()
  }

  async fn list_fighters(&self) -> Result<Vec<Fighter>> {
    let raws: Vec<RawFighter> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FIGHTER_COLS} FROM fighters
           WHERE deleted_at IS NULL ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], RawFighter::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFighter::into_fighter).collect()
  }

  async fn get_or_create_fighter(&self, name: &str) -> Result<Fighter> {
    let name = normalize_name(name);
    let now = encode_dt(Utc::now());

    let raw: RawFighter = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &get_or_create_fighter_sql(),
          rusqlite::params![name, now],
          RawFighter::from_row,
        )?)
      })
      .await?;

    raw.into_fighter()
  }

  async fn upsert_fighter(&self, input: NewFighter) -> Result<Fighter> {
    let mut fighters = self.bulk_upsert_fighters(vec![input]).await?;
    Ok(fighters.remove(0))
  }

  async fn bulk_upsert_fighters(&self, inputs: Vec<NewFighter>) -> Result<Vec<Fighter>> {
    let now = encode_dt(Utc::now());
    let count = inputs.len();

    let raws: Vec<RawFighter> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut rows = Vec::with_capacity(inputs.len());
        {
          let mut stmt = tx.prepare(&upsert_fighter_sql())?;
          for input in inputs {
            rows.push(stmt.query_row(
              rusqlite::params![
                normalize_name(&input.name),
                input.nickname,
                input.age,
                input.wins,
                input.losses,
                input.draws,
                now,
              ],
              RawFighter::from_row,
            )?);
          }
        }
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    debug!(count, "upserted fighters");
    raws.into_iter().map(RawFighter::into_fighter).collect()
  }

  // ── Ranks ─────────────────────────────────────────────────────────────────

  async fn upsert_rank(&self, input: NewRank) -> Result<Rank> {
    let mut ranks = self.bulk_upsert_ranks(vec![input]).await?;
    Ok(ranks.remove(0))
  }

  async fn bulk_upsert_ranks(&self, inputs: Vec<NewRank>) -> Result<Vec<Rank>> {
    let now = encode_dt(Utc::now());
    let count = inputs.len();

    let raws: Vec<RawRank> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut rows = Vec::with_capacity(inputs.len());
        {
          let mut stmt = tx.prepare(&upsert_rank_sql())?;
          for input in inputs {
            rows.push(stmt.query_row(
              rusqlite::params![
                input.rank,
                input.fighter_id,
                input.weight_class_id,
                input.organization_id,
                now,
              ],
              RawRank::from_row,
            )?);
          }
        }
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    debug!(count, "upserted ranks");
    raws.into_iter().map(RawRank::into_rank).collect()
  }

  async fn list_rank_standings(&self) -> Result<Vec<RankStanding>> {
    let raws: Vec<RawStanding> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT r.rank, f.name, w.name, o.name
           FROM ranks r
           JOIN fighters            f ON f.id = r.fighter_id
           JOIN weight_classes      w ON w.id = r.weight_class_id
           JOIN fight_organizations o ON o.id = r.organization_id
           WHERE r.deleted_at IS NULL
             AND f.deleted_at IS NULL
             AND w.deleted_at IS NULL
             AND o.deleted_at IS NULL
           ORDER BY w.name, o.name, r.rank",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawStanding {
              rank:              row.get(0)?,
              fighter_name:      row.get(1)?,
              weight_class_name: row.get(2)?,
              organization_name: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStanding::into_standing).collect()
  }

  // ── Fight cards ───────────────────────────────────────────────────────────

  async fn get_fight_card_by_event(&self, event_name: &str) -> Result<Option<FightCard>> {
    let event_name = event_name.to_owned();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id FROM fight_cards WHERE event_name = ?1 AND deleted_at IS NULL",
              rusqlite::params![event_name],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    match id {
      Some(id) => self.load_fight_card(id).await,
      None => Ok(None),
    }
  }

  async fn list_fight_cards(&self) -> Result<Vec<FightCard>> {
    let raws: Vec<RawFightCard> = self
      .conn
      .call(|conn| {
        let cards = {
          let mut stmt = conn.prepare(&format!(
            "SELECT {FIGHT_CARD_COLS} FROM fight_cards
             WHERE deleted_at IS NULL ORDER BY event_date, id"
          ))?;
          stmt
            .query_map([], RawFightCard::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        let cards = cards
          .into_iter()
          .map(|card| with_fighters(conn, card))
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
      })
      .await?;

    raws.into_iter().map(RawFightCard::into_fight_card).collect()
  }

  async fn get_or_create_fight_card(&self, input: NewFightCard) -> Result<FightCard> {
    let sql = format!(
      "INSERT INTO fight_cards
         (event_name, location, event_date, network, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?5)
       ON CONFLICT(event_name) DO UPDATE SET
         updated_at = CASE WHEN deleted_at IS NULL THEN updated_at ELSE excluded.updated_at END,
         deleted_at = NULL
       RETURNING {FIGHT_CARD_COLS}"
    );
    self.write_fight_card(sql, input).await
  }

  async fn upsert_fight_card(&self, input: NewFightCard) -> Result<FightCard> {
    let sql = format!(
      "INSERT INTO fight_cards
         (event_name, location, event_date, network, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?5)
       ON CONFLICT(event_name) DO UPDATE SET
         location   = excluded.location,
         event_date = excluded.event_date,
         network    = excluded.network,
         updated_at = excluded.updated_at,
         deleted_at = NULL
       RETURNING {FIGHT_CARD_COLS}"
    );
    self.write_fight_card(sql, input).await
  }

  async fn replace_fight_card_fighters(
    &self,
    card_id: i64,
    fighter_ids: &[i64],
  ) -> Result<FightCard> {
    let fighter_ids = fighter_ids.to_vec();
    let now = encode_dt(Utc::now());

    let touched: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let touched = tx.execute(
          "UPDATE fight_cards SET updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
          rusqlite::params![now, card_id],
        )?;
        if touched > 0 {
          tx.execute(
            "DELETE FROM fight_card_fighters WHERE fight_card_id = ?1",
            rusqlite::params![card_id],
          )?;
          let mut stmt = tx.prepare(
            "INSERT INTO fight_card_fighters (fight_card_id, fighter_id, position)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(fight_card_id, fighter_id) DO NOTHING",
          )?;
          for (position, fighter_id) in fighter_ids.iter().enumerate() {
            stmt.execute(rusqlite::params![card_id, fighter_id, position as i64])?;
          }
        }
        tx.commit()?;
        Ok(touched)
      })
      .await?;

    if touched == 0 {
      return Err(Error::FightCardNotFound(card_id));
    }
    self
      .load_fight_card(card_id)
      .await?
      .ok_or(Error::FightCardNotFound(card_id))
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn soft_delete(&self, kind: EntityKind, id: i64) -> Result<bool> {
    let table = table_for(kind);
    let now = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!(
            "UPDATE {table} SET deleted_at = ?1, updated_at = ?1
             WHERE id = ?2 AND deleted_at IS NULL"
          ),
          rusqlite::params![now, id],
        )?)
      })
      .await?;

    debug!(%kind, id, deleted = changed > 0, "soft delete");
    Ok(changed > 0)
  }
}
