//! Background persistence loop
//!
//! Sleeps for a fixed interval, snapshots the engine, writes the file, and
//! goes back to sleep whatever the outcome. A failed save is logged and the
//! next cycle runs on schedule. Cancelling the token ends the loop after one
//! final save.

use super::file;
use crate::metrics;
use crate::store::StorageEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Path to the snapshot file
    pub path: PathBuf,
    /// Time between two saves
    pub interval: Duration,
}

/// Running totals of save attempts, published after every attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub attempts: u64,
    pub failures: u64,
    /// Outcome of the most recent attempt
    pub last_ok: bool,
}

/// Periodic snapshot writer
pub struct PersistenceScheduler {
    engine: Arc<StorageEngine>,
    config: PersistConfig,
    report: watch::Sender<PersistReport>,
}

impl PersistenceScheduler {
    pub fn new(engine: Arc<StorageEngine>, config: PersistConfig) -> Self {
        let (report, _) = watch::channel(PersistReport::default());
        PersistenceScheduler { engine, config, report }
    }

    /// Watch the outcome of each save attempt
    pub fn subscribe(&self) -> watch::Receiver<PersistReport> {
        self.report.subscribe()
    }

    /// Start the loop as a background task
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Run until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            path = %self.config.path.display(),
            interval_secs = self.config.interval.as_secs_f64(),
            "Persistence loop starting"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            self.persist_once().await;
        }

        info!("Persistence loop stopping, writing final snapshot");
        self.persist_once().await;

        let report = *self.report.borrow();
        info!(
            attempts = report.attempts,
            failures = report.failures,
            "Persistence loop stopped"
        );
    }

    /// Take one snapshot and write it, returns true on success
    pub async fn persist_once(&self) -> bool {
        let engine = self.engine.clone();
        let path = self.config.path.clone();

        // Snapshot and file write both block, keep them off the async workers
        let outcome = tokio::task::spawn_blocking(move || {
            let records = engine.snapshot();
            let count = records.len();
            file::save(&path, &records).map(|bytes| (count, bytes))
        })
        .await;

        let ok = match outcome {
            Ok(Ok((count, bytes))) => {
                metrics::SNAPSHOT_SAVES_TOTAL.inc();
                metrics::RECORDS.set(count as i64);
                debug!(records = count, bytes, "Snapshot saved");
                true
            }
            Ok(Err(e)) => {
                metrics::SNAPSHOT_FAILURES_TOTAL.inc();
                error!(error = %e, "Error saving snapshot");
                false
            }
            Err(e) => {
                metrics::SNAPSHOT_FAILURES_TOTAL.inc();
                error!(error = %e, "Snapshot task failed");
                false
            }
        };

        self.report.send_modify(|report| {
            report.attempts += 1;
            if !ok {
                report.failures += 1;
            }
            report.last_ok = ok;
        });
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::load;
    use crate::store::Record;
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_secs(30);

    fn engine_with(key: &str, json: &str) -> Arc<StorageEngine> {
        let engine = Arc::new(StorageEngine::new());
        engine.put(key, Record::from_json(key, json).unwrap());
        engine
    }

    /// Paused time lands on timer ticks, allow for millisecond rounding
    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_secs(1),
            "elapsed {:?}, expected {:?}",
            elapsed,
            expected
        );
    }

    /// Wait until at least `attempts` saves have been attempted
    async fn wait_for_attempts(rx: &mut watch::Receiver<PersistReport>, attempts: u64) -> PersistReport {
        loop {
            let report = *rx.borrow_and_update();
            if report.attempts >= attempts {
                return report;
            }
            rx.changed().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_persist_once_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let engine = engine_with("a", r#"{"x":1}"#);

        let scheduler = PersistenceScheduler::new(
            engine.clone(),
            PersistConfig { path: path.clone(), interval: INTERVAL },
        );
        let rx = scheduler.subscribe();

        assert!(scheduler.persist_once().await);
        assert_eq!(load(&path).unwrap(), engine.snapshot());
        assert_eq!(*rx.borrow(), PersistReport { attempts: 1, failures: 0, last_ok: true });
    }

    #[tokio::test]
    async fn test_persist_once_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = PersistenceScheduler::new(
            engine_with("a", "1"),
            PersistConfig {
                path: dir.path().join("missing/storage.json"),
                interval: INTERVAL,
            },
        );
        let rx = scheduler.subscribe();

        assert!(!scheduler.persist_once().await);
        assert!(!scheduler.persist_once().await);
        assert_eq!(*rx.borrow(), PersistReport { attempts: 2, failures: 2, last_ok: false });
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_happen_once_per_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let engine = engine_with("a", "1");

        let scheduler = PersistenceScheduler::new(
            engine.clone(),
            PersistConfig { path: path.clone(), interval: INTERVAL },
        );
        let mut rx = scheduler.subscribe();
        let shutdown = CancellationToken::new();
        let start = Instant::now();
        let handle = scheduler.spawn(shutdown.clone());

        let report = wait_for_attempts(&mut rx, 1).await;
        assert_eq!(report, PersistReport { attempts: 1, failures: 0, last_ok: true });
        assert_elapsed(start, INTERVAL);

        engine.put("b", Record::from_json("b", "2").unwrap());
        let report = wait_for_attempts(&mut rx, 2).await;
        assert_eq!(report.attempts, 2);
        assert_elapsed(start, INTERVAL * 2);
        assert_eq!(load(&path).unwrap()["b"].value_json(), "2");

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_or_slow_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("later");
        let path = target.join("storage.json");

        let scheduler = PersistenceScheduler::new(
            engine_with("a", r#"{"x":1}"#),
            PersistConfig { path: path.clone(), interval: INTERVAL },
        );
        let mut rx = scheduler.subscribe();
        let shutdown = CancellationToken::new();
        let start = Instant::now();
        let handle = scheduler.spawn(shutdown.clone());

        for cycle in 1..=3u32 {
            let report = wait_for_attempts(&mut rx, cycle as u64).await;
            assert_eq!(
                report,
                PersistReport { attempts: cycle as u64, failures: cycle as u64, last_ok: false }
            );
            assert_elapsed(start, INTERVAL * cycle);
        }

        // once the directory exists the next cycle succeeds on schedule
        std::fs::create_dir_all(&target).unwrap();
        let report = wait_for_attempts(&mut rx, 4).await;
        assert_eq!(report, PersistReport { attempts: 4, failures: 3, last_ok: true });
        assert_elapsed(start, INTERVAL * 4);
        assert_eq!(load(&path).unwrap()["a"].value_json(), r#"{"x":1}"#);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_writes_final_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let engine = engine_with("a", r#"{"x":1}"#);

        let scheduler = PersistenceScheduler::new(
            engine.clone(),
            PersistConfig { path: path.clone(), interval: Duration::from_secs(3600) },
        );
        let rx = scheduler.subscribe();
        let shutdown = CancellationToken::new();
        let start = Instant::now();
        let handle = scheduler.spawn(shutdown.clone());

        engine.put("b", Record::from_json("b", "2").unwrap());
        shutdown.cancel();
        handle.await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(3600));
        assert_eq!(rx.borrow().attempts, 1);
        let saved = load(&path).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved["b"].value_json(), "2");
    }
}
