//! Error types for `sbtb-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown fight organization: {0:?}")]
  UnknownOrganization(String),

  #[error("unknown entity kind: {0:?}")]
  UnknownEntityKind(String),
}

/// A raw reference that could not be matched against the store.
///
/// Never fatal for a run: the reconciler logs it and skips the entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
  #[error("weight class not found: {0:?}")]
  UnknownWeightClass(String),

  #[error("organization not found: {0:?}")]
  UnknownOrganization(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
