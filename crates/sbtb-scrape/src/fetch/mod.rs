//! Retrieval of page markup.
//!
//! Two strategies sit behind the [`Fetcher`] trait: [`HttpFetcher`] for pages
//! served as static markup, and [`BrowserFetcher`] for pages that only render
//! their content after scripted interaction.

mod browser;
mod http;

use std::{collections::BTreeMap, future::Future};

use serde::Deserialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

pub use browser::{BrowserConfig, BrowserFetcher};
pub use http::{HttpFetchConfig, HttpFetcher};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// One step of an interactive browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum InteractionStep {
  Navigate,
  DismissConsent,
  Scroll,
  LoadMore,
  WaitForContent,
}

#[derive(Debug, Error)]
pub enum FetchError {
  /// Every attempt finished without a 200; carries the last response.
  #[error("HTTP {status} after retries")]
  HttpFailure { status: u16, body: String },

  #[error("transport error: {0}")]
  Transport(Box<dyn std::error::Error + Send + Sync>),

  #[error("timed out during browser step `{0}`")]
  InteractionTimeout(InteractionStep),

  #[error("invalid header: {0}")]
  InvalidHeader(String),
}

impl FetchError {
  pub(crate) fn transport(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self::Transport(e.into())
  }
}

// ─── Fetcher trait ───────────────────────────────────────────────────────────

/// Produces the markup of one page.
pub trait Fetcher: Send + Sync {
  fn fetch<'a>(
    &'a self,
    target: &'a str,
  ) -> impl Future<Output = Result<String, FetchError>> + Send + 'a;
}

// ─── Header set ──────────────────────────────────────────────────────────────

/// Request headers sent with every static fetch.
///
/// Deserialises either from a map or from a string holding a JSON object,
/// so the whole set can be supplied through a single environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HeaderSource")]
pub struct HeaderSet(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderSource {
  Map(BTreeMap<String, String>),
  Encoded(String),
}

impl TryFrom<HeaderSource> for HeaderSet {
  type Error = serde_json::Error;

  fn try_from(source: HeaderSource) -> Result<Self, Self::Error> {
    match source {
      HeaderSource::Map(map) => Ok(Self(map)),
      HeaderSource::Encoded(s) if s.trim().is_empty() => Ok(Self::default()),
      HeaderSource::Encoded(s) => serde_json::from_str(&s).map(Self),
    }
  }
}

impl HeaderSet {
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}
