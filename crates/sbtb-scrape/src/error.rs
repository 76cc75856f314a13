//! Error types for `sbtb-scrape`.

use scraper::error::SelectorErrorKind;
use thiserror::Error;

/// The page did not have the shape the parser expects.
///
/// Always fatal for the page: no partial result is returned.
#[derive(Debug, Error)]
pub enum ParseError {
  #[error("{context}: missing element `{selector}`")]
  MissingElement {
    context:  &'static str,
    selector: &'static str,
  },

  #[error("section {index} has no rankings block after it")]
  UnpairedSection { index: usize },

  #[error("page layout is empty: {0}")]
  EmptyLayout(&'static str),

  #[error("weight class {0:?} is listed twice")]
  DuplicateDivision(String),

  #[error("{division}: organization {organization:?} is listed twice")]
  DuplicateOrganization {
    division:     String,
    organization: String,
  },

  #[error("fighter slot holds {segments} names, at most 2 expected")]
  CrowdedSlot { segments: usize },

  #[error("cannot read pounds from {0:?}")]
  InvalidPounds(String),

  #[error("invalid selector: {0}")]
  Selector(String),
}

impl From<SelectorErrorKind<'_>> for ParseError {
  fn from(e: SelectorErrorKind<'_>) -> Self { Self::Selector(e.to_string()) }
}

/// Why a pipeline run failed.
///
/// A fetch failure is not in this list: it ends the run with an empty
/// result instead.
#[derive(Debug, Error)]
pub enum RunError {
  #[error("parse error: {0}")]
  Parse(#[from] ParseError),

  #[error("persistence error: {0}")]
  Persistence(Box<dyn std::error::Error + Send + Sync>),
}

impl RunError {
  pub fn persistence(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Persistence(Box::new(e))
  }
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;
