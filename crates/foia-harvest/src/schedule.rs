//! Repeat the crawl on a fixed period.

use crate::crawl::Harvester;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Run the crawl immediately and then once per `every` until `shutdown`
/// resolves. A failed run is logged; the next tick still happens.
///
/// Returns the number of runs started. A run in progress is not interrupted.
pub async fn run_periodically<F>(harvester: &Harvester, every: Duration, shutdown: F) -> u64
where
    F: Future<Output = ()>,
{
    tracing::info!("periodic harvest started: every {}s", every.as_secs());
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    let mut runs: u64 = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("periodic harvest stopping after {runs} run(s)");
                return runs;
            }
            _ = ticker.tick() => {
                runs += 1;
                match harvester.run().await {
                    Ok(summary) => tracing::info!(
                        "run {runs}: {} file(s) written",
                        summary.files_written()
                    ),
                    Err(e) => tracing::warn!("run {runs} failed: {e}"),
                }
            }
        }
    }
}
