//! Runtime configuration, layered from an optional TOML file and `SBTB__*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File, FileFormat};
use sbtb_scrape::fetch::{BrowserConfig, HeaderSet, HttpFetchConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default)]
  pub server:     ServerConfig,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  pub scrape:     ScrapeConfig,
  #[serde(default)]
  pub browser:    BrowserSection,
  #[serde(default)]
  pub schedule:   ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self { Self { host: "127.0.0.1".to_owned(), port: 8080 } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
  pub rankings_url:    String,
  pub schedule_url:    String,
  /// Map or JSON-object string.
  #[serde(default)]
  pub headers:         HeaderSet,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:    u64,
  #[serde(default = "default_max_retries")]
  pub max_retries:     u32,
  #[serde(default)]
  pub retry_delay_ms:  u64,
  /// Zone the schedule page prints its times in.
  #[serde(default = "default_source_timezone")]
  pub source_timezone: Tz,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
  pub headless:           bool,
  pub window_width:       u32,
  pub window_height:      u32,
  pub user_agent:         Option<String>,
  pub step_timeout_secs:  u64,
  pub consent_selector:   Option<String>,
  pub load_more_selector: Option<String>,
  pub load_more_clicks:   u32,
  pub content_selector:   String,
}

impl Default for BrowserSection {
  fn default() -> Self {
    Self {
      headless:           true,
      window_width:       1920,
      window_height:      1080,
      user_agent:         None,
      step_timeout_secs:  20,
      consent_selector:   None,
      load_more_selector: None,
      load_more_clicks:   0,
      content_selector:   ".fight-schedule".to_owned(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleConfig {
  /// Run both pipelines this often; unset disables the scheduler.
  pub interval_secs: Option<u64>,
}

fn default_store_path() -> PathBuf { PathBuf::from("sbtb.db") }
fn default_timeout_secs() -> u64 { 5 }
fn default_max_retries() -> u32 { 3 }
fn default_source_timezone() -> Tz { Tz::EST }

impl AppConfig {
  /// Read `path` if it exists, then apply `SBTB__SECTION__KEY` overrides.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix("SBTB").separator("__"))
      .build()?
      .try_deserialize()
  }

  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Config::builder()
      .add_source(File::from_str(source, FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  pub fn http_fetch_config(&self) -> HttpFetchConfig {
    HttpFetchConfig {
      headers:     self.scrape.headers.clone(),
      timeout:     Duration::from_secs(self.scrape.timeout_secs),
      max_retries: self.scrape.max_retries,
      retry_delay: Duration::from_millis(self.scrape.retry_delay_ms),
    }
  }

  pub fn browser_config(&self) -> BrowserConfig {
    let b = &self.browser;
    let defaults = BrowserConfig::default();
    BrowserConfig {
      headless:           b.headless,
      window_size:        (b.window_width, b.window_height),
      user_agent:         b.user_agent.clone().unwrap_or(defaults.user_agent),
      step_timeout:       Duration::from_secs(b.step_timeout_secs),
      consent_selector:   b.consent_selector.clone(),
      load_more_selector: b.load_more_selector.clone(),
      load_more_clicks:   b.load_more_clicks,
      content_selector:   b.content_selector.clone(),
    }
  }

  pub fn schedule_interval(&self) -> Option<Duration> {
    self
      .schedule
      .interval_secs
      .filter(|secs| *secs > 0)
      .map(Duration::from_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINIMAL: &str = r#"
    [scrape]
    rankings_url = "https://example.com/rankings"
    schedule_url = "https://example.com/schedule"
  "#;

  #[test]
  fn minimal_config_fills_defaults() {
    let config = AppConfig::from_toml(MINIMAL).unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.store_path, PathBuf::from("sbtb.db"));
    assert_eq!(config.scrape.source_timezone, Tz::EST);
    assert!(config.scrape.headers.is_empty());
    assert_eq!(config.schedule_interval(), None);

    let http = config.http_fetch_config();
    assert_eq!(http.timeout, Duration::from_secs(5));
    assert_eq!(http.max_retries, 3);
    assert_eq!(http.retry_delay, Duration::ZERO);

    let browser = config.browser_config();
    assert!(browser.headless);
    assert_eq!(browser.window_size, (1920, 1080));
    assert_eq!(browser.content_selector, ".fight-schedule");
  }

  #[test]
  fn headers_accept_json_string() {
    let source = format!(
      "{MINIMAL}\nheaders = '{{\"Accept\": \"text/html\"}}'\n"
    );
    let config = AppConfig::from_toml(&source).unwrap();
    assert_eq!(config.scrape.headers.get("accept"), Some("text/html"));
  }

  #[test]
  fn explicit_values_override_defaults() {
    let source = r#"
      store_path = "~/sbtb/data.db"

      [server]
      host = "0.0.0.0"
      port = 9000

      [scrape]
      rankings_url = "r"
      schedule_url = "s"
      max_retries = 5
      retry_delay_ms = 250
      source_timezone = "America/New_York"

      [browser]
      headless = false
      load_more_clicks = 2

      [schedule]
      interval_secs = 3600
    "#;
    let config = AppConfig::from_toml(source).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.scrape.source_timezone, Tz::America__New_York);
    assert_eq!(config.http_fetch_config().retry_delay, Duration::from_millis(250));
    assert!(!config.browser_config().headless);
    assert_eq!(config.schedule_interval(), Some(Duration::from_secs(3600)));
  }

  #[test]
  fn missing_urls_are_rejected() {
    assert!(AppConfig::from_toml("[scrape]\nrankings_url = \"r\"\n").is_err());
  }
}
