//! Error type for `sbtb-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] sbtb_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("fight card not found: {0}")]
  FightCardNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
