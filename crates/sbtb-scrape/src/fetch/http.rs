//! Static-markup fetcher with bounded retries.

use std::time::Duration;

use reqwest::{
  Client, StatusCode,
  header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::{debug, warn};

use super::{FetchError, Fetcher, HeaderSet};

#[derive(Debug, Clone)]
pub struct HttpFetchConfig {
  pub headers:     HeaderSet,
  /// Per-attempt timeout.
  pub timeout:     Duration,
  /// Total attempts; values below one are treated as one.
  pub max_retries: u32,
  /// Fixed pause between attempts.
  pub retry_delay: Duration,
}

impl Default for HttpFetchConfig {
  fn default() -> Self {
    Self {
      headers:     HeaderSet::default(),
      timeout:     Duration::from_secs(5),
      max_retries: 3,
      retry_delay: Duration::ZERO,
    }
  }
}

/// GETs a page, retrying until it answers 200 or attempts run out.
///
/// Clones share the inner [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client:      Client,
  attempts:    u32,
  retry_delay: Duration,
}

fn header_map(headers: &HeaderSet) -> Result<HeaderMap, FetchError> {
  let mut map = HeaderMap::new();
  for (name, value) in headers.iter() {
    let name = HeaderName::from_bytes(name.as_bytes())
      .map_err(|_| FetchError::InvalidHeader(name.to_owned()))?;
    let value = HeaderValue::from_str(value)
      .map_err(|_| FetchError::InvalidHeader(name.to_string()))?;
    map.insert(name, value);
  }
  Ok(map)
}

impl HttpFetcher {
  pub fn new(config: HttpFetchConfig) -> Result<Self, FetchError> {
    let client = Client::builder()
      .default_headers(header_map(&config.headers)?)
      .timeout(config.timeout)
      .build()
      .map_err(FetchError::transport)?;
    Ok(Self {
      client,
      attempts: config.max_retries.max(1),
      retry_delay: config.retry_delay,
    })
  }
}

impl Fetcher for HttpFetcher {
  async fn fetch(&self, target: &str) -> Result<String, FetchError> {
    let mut last = None;

    for attempt in 1..=self.attempts {
      if attempt > 1 && !self.retry_delay.is_zero() {
        tokio::time::sleep(self.retry_delay).await;
      }

      match self.client.get(target).send().await {
        Ok(resp) if resp.status() == StatusCode::OK => {
          debug!(url = target, attempt, "fetched page");
          return resp.text().await.map_err(FetchError::transport);
        }
        Ok(resp) => {
          let status = resp.status().as_u16();
          let body = resp.text().await.unwrap_or_default();
          warn!(url = target, attempt, status, "unexpected status");
          last = Some(FetchError::HttpFailure { status, body });
        }
        Err(e) => {
          warn!(url = target, attempt, error = %e, "request failed");
          last = Some(FetchError::transport(e));
        }
      }
    }

    Err(last.unwrap_or_else(|| FetchError::transport("no fetch attempt was made")))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::{Router, extract::State, http::HeaderMap as AxumHeaders, routing::get};
  use tokio::net::TcpListener;

  use super::*;

  /// Serve `router` on an ephemeral port and return its base URL.
  async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
  }

  /// Answers 503 to the first `failures` requests, then 200.
  fn flaky(failures: usize) -> (Router, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
      .route(
        "/",
        get(move |State(hits): State<Arc<AtomicUsize>>| async move {
          let n = hits.fetch_add(1, Ordering::SeqCst);
          if n < failures {
            (axum::http::StatusCode::SERVICE_UNAVAILABLE, "busy".to_owned())
          } else {
            (axum::http::StatusCode::OK, "<html>ok</html>".to_owned())
          }
        }),
      )
      .with_state(hits.clone());
    (router, hits)
  }

  fn config(max_retries: u32) -> HttpFetchConfig {
    HttpFetchConfig { max_retries, ..Default::default() }
  }

  #[tokio::test]
  async fn retries_until_ok() {
    let (router, hits) = flaky(2);
    let url = serve(router).await;

    let body = HttpFetcher::new(config(3)).unwrap().fetch(&url).await.unwrap();
    assert_eq!(body, "<html>ok</html>");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn reports_last_failure_when_attempts_run_out() {
    let (router, hits) = flaky(10);
    let url = serve(router).await;

    let err = HttpFetcher::new(config(2)).unwrap().fetch(&url).await.unwrap_err();
    match err {
      FetchError::HttpFailure { status, body } => {
        assert_eq!(status, 503);
        assert_eq!(body, "busy");
      }
      other => panic!("expected HttpFailure, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn zero_retries_still_makes_one_attempt() {
    let (router, hits) = flaky(0);
    let url = serve(router).await;

    HttpFetcher::new(config(0)).unwrap().fetch(&url).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn sends_configured_headers() {
    let router = Router::new().route(
      "/",
      get(|headers: AxumHeaders| async move {
        headers
          .get("x-sbtb")
          .and_then(|v| v.to_str().ok())
          .unwrap_or("missing")
          .to_owned()
      }),
    );
    let url = serve(router).await;

    let fetcher = HttpFetcher::new(HttpFetchConfig {
      headers: [("X-Sbtb", "hello")].into_iter().collect(),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(fetcher.fetch(&url).await.unwrap(), "hello");
  }

  #[tokio::test]
  async fn unreachable_host_is_transport_error() {
    let fetcher = HttpFetcher::new(config(1)).unwrap();
    let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
  }

  #[test]
  fn bad_header_name_is_rejected() {
    let err = HttpFetcher::new(HttpFetchConfig {
      headers: [("bad header", "x")].into_iter().collect(),
      ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, FetchError::InvalidHeader(_)));
  }
}
