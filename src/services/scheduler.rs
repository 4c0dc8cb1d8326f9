//! Periodic refresh driver.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::orchestrator::Orchestrator;

pub struct RefreshScheduler {
    orchestrator: Arc<Orchestrator>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(orchestrator: Arc<Orchestrator>, period: Duration) -> Self {
        Self {
            orchestrator,
            period,
        }
    }

    /// Refresh every period until `shutdown` flips to true or its sender is
    /// dropped. The first tick is one full period after start.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("RefreshScheduler: starting (interval={}s)", self.period.as_secs());

        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let batch = self.orchestrator.refresh_all().await;
                    debug!("RefreshScheduler: cycle complete ({} entities)", batch.entity_count);
                    self.orchestrator.metrics().log_status();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("RefreshScheduler: stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::ml::{LinearModel, StandardScaler};
    use crate::orchestrator::RefreshSettings;
    use crate::scoring::Scorer;
    use crate::services::metrics::RefreshMetrics;
    use crate::signals::{SignalCollector, SimulatedSignalSource};
    use std::sync::atomic::Ordering;

    fn orchestrator() -> Arc<Orchestrator> {
        let collector = SignalCollector::new(
            Arc::new(SimulatedSignalSource::new()),
            vec!["AAPL".to_string()],
            Duration::from_secs(1),
        );
        Arc::new(Orchestrator::new(
            collector,
            Arc::new(Scorer::new(
                Arc::new(LinearModel::constant(600.0, 11)),
                StandardScaler::identity(11),
            )),
            Arc::new(InMemoryCache::new()),
            RefreshSettings::default(),
            Arc::new(RefreshMetrics::new()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_each_period_until_shutdown() {
        let orch = orchestrator();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(
            RefreshScheduler::new(orch.clone(), Duration::from_secs(60)).run(rx),
        );

        time::sleep(Duration::from_secs(150)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let started = orch.metrics().refreshes_started.load(Ordering::Relaxed);
        assert_eq!(started, 2);
        assert!(!orch.is_refreshing());
    }
}
