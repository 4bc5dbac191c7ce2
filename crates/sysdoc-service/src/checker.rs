//! Background consistency checker for the entity index.

use std::sync::Arc;
use std::time::Duration;

use sysdoc_core::config::IndexConfig;
use sysdoc_core::errors::{SysdocError, SysdocResult};
use sysdoc_index::{ConsistencyReport, IndexStore};
use sysdoc_observability::tracing_setup::events;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Periodically checks the store and repairs any inconsistency it finds.
///
/// A turn waits at most `write_grace_ms` for in-flight ingestion and is
/// skipped otherwise. Queries are never blocked.
pub struct ConsistencyChecker {
    store: Arc<IndexStore>,
    config: IndexConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl ConsistencyChecker {
    pub fn new(store: Arc<IndexStore>, config: IndexConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store,
            config,
            shutdown_tx,
        }
    }

    /// Spawn the periodic task. It is subscribed to shutdown before this
    /// returns, so a `shutdown` sent right after still stops it.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            self.run(shutdown_rx).await;
        })
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = Duration::from_secs(self.config.consistency_check_interval_secs.max(1));
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.check_once().await {
                        warn!(error = %e, "consistency check failed");
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!("consistency checker stopped");
                    break;
                }
            }
        }
    }

    /// One maintenance turn. `None` when writers kept the store busy.
    pub async fn check_once(&self) -> SysdocResult<Option<ConsistencyReport>> {
        let store = Arc::clone(&self.store);
        let grace = Duration::from_millis(self.config.write_grace_ms);
        let report = tokio::task::spawn_blocking(move || store.maintain(grace))
            .await
            .map_err(|e| SysdocError::ConcurrencyError(format!("consistency task failed: {e}")))??;

        if let Some(report) = &report {
            if report.is_consistent() {
                debug!(
                    chunks = report.checked_chunks,
                    entries = report.checked_entries,
                    "index consistent"
                );
            } else {
                events::index_repaired(report.violation_count());
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_is_consistent() {
        let checker = ConsistencyChecker::new(Arc::new(IndexStore::new()), IndexConfig::default());
        let report = checker.check_once().await.unwrap().unwrap();
        assert!(report.is_consistent());
    }

    #[tokio::test]
    async fn shutdown_stops_the_task() {
        let config = IndexConfig {
            consistency_check_interval_secs: 1,
            write_grace_ms: 10,
        };
        let checker = Arc::new(ConsistencyChecker::new(Arc::new(IndexStore::new()), config));
        let handle = Arc::clone(&checker).start();

        tokio::time::sleep(Duration::from_millis(20)).await;
        checker.shutdown();

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(joined.is_ok());
    }

    #[tokio::test]
    async fn shutdown_before_first_poll_is_not_lost() {
        let checker = Arc::new(ConsistencyChecker::new(
            Arc::new(IndexStore::new()),
            IndexConfig::default(),
        ));
        // No await between start and shutdown: the task has not run yet.
        let handle = Arc::clone(&checker).start();
        checker.shutdown();

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(joined.is_ok());
    }
}
