//! Periodic pipeline runs.

use std::{sync::Arc, time::Duration};

use sbtb_scrape::Pipeline;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Run both pipelines every `interval`, starting immediately. Never returns.
///
/// A failed run is logged and the loop carries on with the next tick.
pub async fn run_every<R, C>(interval: Duration, rankings: Arc<R>, fight_cards: Arc<C>)
where
  R: Pipeline,
  C: Pipeline,
{
  let mut ticker = tokio::time::interval(interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  info!(interval_secs = interval.as_secs(), "scheduler started");

  loop {
    ticker.tick().await;
    run_logged("rankings", rankings.as_ref()).await;
    run_logged("fight-cards", fight_cards.as_ref()).await;
  }
}

async fn run_logged<P: Pipeline>(name: &'static str, pipeline: &P) {
  match pipeline.run().await {
    Ok(records) => info!(pipeline = name, records = records.len(), "scheduled run finished"),
    Err(e) => error!(pipeline = name, error = %e, "scheduled run failed"),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use sbtb_scrape::{ParseError, RunError};

  use super::*;

  /// Counts its runs; fails every one of them when `fail` is set.
  #[derive(Default)]
  struct Counting {
    runs: AtomicUsize,
    fail: bool,
  }

  impl Pipeline for Counting {
    type Record = usize;

    async fn run(&self) -> Result<Vec<usize>, RunError> {
      let n = self.runs.fetch_add(1, Ordering::SeqCst);
      if self.fail {
        Err(RunError::Parse(ParseError::EmptyLayout("stub")))
      } else {
        Ok(vec![n])
      }
    }
  }

  #[tokio::test(start_paused = true)]
  async fn runs_on_every_tick_despite_failures() {
    let ok = Arc::new(Counting::default());
    let failing = Arc::new(Counting { fail: true, ..Default::default() });

    let handle = tokio::spawn(run_every(
      Duration::from_secs(10),
      ok.clone(),
      failing.clone(),
    ));

    // Ticks at 0s, 10s and 20s.
    tokio::time::sleep(Duration::from_secs(25)).await;
    handle.abort();

    assert_eq!(ok.runs.load(Ordering::SeqCst), 3);
    assert_eq!(failing.runs.load(Ordering::SeqCst), 3);
  }
}
