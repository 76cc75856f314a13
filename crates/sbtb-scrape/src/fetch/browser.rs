//! Interactive fetcher driving a headless Chrome session.
//!
//! The session is synchronous, so each fetch runs on the blocking pool. The
//! browser process belongs to a [`Session`] guard and is torn down when the
//! guard drops, whichever way the fetch ends.

use std::{ffi::OsStr, sync::Arc, time::Duration};

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info, warn};

use super::{FetchError, Fetcher, InteractionStep};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
   AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const LAUNCH_ARGS: &[&str] = &[
  "--disable-blink-features=AutomationControlled",
  "--disable-gpu",
  "--disable-dev-shm-usage",
  "--disable-infobars",
];

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";

#[derive(Debug, Clone)]
pub struct BrowserConfig {
  pub headless:           bool,
  pub window_size:        (u32, u32),
  pub user_agent:         String,
  /// Upper bound on every individual wait.
  pub step_timeout:       Duration,
  /// Cookie/consent control to click after navigation, if any.
  pub consent_selector:   Option<String>,
  /// "Load more" control, if the page paginates in place.
  pub load_more_selector: Option<String>,
  pub load_more_clicks:   u32,
  /// Element whose presence means the content has rendered.
  pub content_selector:   String,
}

impl Default for BrowserConfig {
  fn default() -> Self {
    Self {
      headless:           true,
      window_size:        (1920, 1080),
      user_agent:         DEFAULT_USER_AGENT.to_owned(),
      step_timeout:       Duration::from_secs(20),
      consent_selector:   None,
      load_more_selector: None,
      load_more_clicks:   0,
      content_selector:   "body".to_owned(),
    }
  }
}

/// Renders a page in a fresh browser per fetch.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
  config: Arc<BrowserConfig>,
}

impl BrowserFetcher {
  pub fn new(config: BrowserConfig) -> Self { Self { config: Arc::new(config) } }
}

impl Fetcher for BrowserFetcher {
  async fn fetch(&self, target: &str) -> Result<String, FetchError> {
    let config = Arc::clone(&self.config);
    let target = target.to_owned();

    tokio::task::spawn_blocking(move || render(&config, &target))
      .await
      .map_err(FetchError::transport)?
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Owns the browser for one fetch.
struct Session {
  tab:      Arc<Tab>,
  // Dropping the browser kills the Chrome process.
  _browser: Browser,
}

impl Session {
  fn launch(config: &BrowserConfig) -> Result<Self, FetchError> {
    let window_size = format!(
      "--window-size={},{}",
      config.window_size.0, config.window_size.1
    );
    let args: Vec<&OsStr> = LAUNCH_ARGS
      .iter()
      .map(OsStr::new)
      .chain(std::iter::once(OsStr::new(window_size.as_str())))
      .collect();

    let options = LaunchOptions::default_builder()
      .headless(config.headless)
      .sandbox(false)
      .window_size(Some(config.window_size))
      .args(args)
      .ignore_default_args(vec![OsStr::new("--enable-automation")])
      .idle_browser_timeout(config.step_timeout * 3)
      .build()
      .map_err(|e| FetchError::transport(e.to_string()))?;

    let browser = Browser::new(options).map_err(FetchError::transport)?;
    let tab = browser.new_tab().map_err(FetchError::transport)?;

    tab.set_default_timeout(config.step_timeout);
    // Hides navigator.webdriver and fakes languages, plugins and platform.
    tab.enable_stealth_mode().map_err(FetchError::transport)?;
    tab
      .set_user_agent(&config.user_agent, Some("en-US,en"), Some("Win32"))
      .map_err(FetchError::transport)?;

    Ok(Self { tab, _browser: browser })
  }

  fn click(
    &self,
    selector: &str,
    timeout: Duration,
    step: InteractionStep,
  ) -> Result<(), FetchError> {
    let element = self
      .tab
      .wait_for_element_with_custom_timeout(selector, timeout)
      .map_err(|_| FetchError::InteractionTimeout(step))?;
    element.click().map_err(FetchError::transport)?;
    Ok(())
  }
}

impl Drop for Session {
  fn drop(&mut self) {
    if let Err(e) = self.tab.close(true) {
      debug!(error = %e, "closing tab failed; browser will be killed");
    }
  }
}

fn render(config: &BrowserConfig, target: &str) -> Result<String, FetchError> {
  info!(url = target, headless = config.headless, "launching browser");
  let session = Session::launch(config)?;
  let timeout = config.step_timeout;

  session.tab.navigate_to(target).map_err(FetchError::transport)?;
  session
    .tab
    .wait_until_navigated()
    .map_err(|_| FetchError::InteractionTimeout(InteractionStep::Navigate))?;

  if let Some(selector) = &config.consent_selector {
    session.click(selector, timeout, InteractionStep::DismissConsent)?;
    debug!(url = target, "dismissed consent prompt");
  }

  session
    .tab
    .evaluate(SCROLL_TO_BOTTOM, false)
    .map_err(|_| FetchError::InteractionTimeout(InteractionStep::Scroll))?;

  if let Some(selector) = &config.load_more_selector {
    for click in 0..config.load_more_clicks {
      match session.click(selector, timeout, InteractionStep::LoadMore) {
        Ok(()) => debug!(url = target, click = click + 1, "clicked load more"),
        // The control disappears once everything is loaded.
        Err(FetchError::InteractionTimeout(_)) if click > 0 => {
          warn!(url = target, clicks = click, "load more control gone early");
          break;
        }
        Err(e) => return Err(e),
      }
    }
  }

  session
    .tab
    .wait_for_element_with_custom_timeout(&config.content_selector, timeout)
    .map_err(|_| FetchError::InteractionTimeout(InteractionStep::WaitForContent))?;

  let markup = session.tab.get_content().map_err(FetchError::transport)?;
  debug!(url = target, bytes = markup.len(), "rendered page");
  Ok(markup)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_config_matches_desktop_chrome() {
    let config = BrowserConfig::default();
    assert!(config.headless);
    assert_eq!(config.window_size, (1920, 1080));
    assert!(config.user_agent.contains("Chrome/120.0.0.0"));
    assert_eq!(config.load_more_clicks, 0);
  }

  #[test]
  fn launch_args_disable_automation_markers() {
    assert!(LAUNCH_ARGS.contains(&"--disable-blink-features=AutomationControlled"));
    assert!(LAUNCH_ARGS.contains(&"--disable-infobars"));
  }
}
