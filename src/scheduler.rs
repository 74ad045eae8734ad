//! Periodic produce-then-publish loop, off the request-serving path.
//! Used by: service.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::snapshot::{SnapshotProducer, SnapshotStore};

/// Delay before the first tick after (re)scheduling.
pub const WARMUP_DELAY: Duration = Duration::from_secs(1);
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct Scheduler {
    producer: Arc<Mutex<SnapshotProducer>>,
    store: Arc<SnapshotStore>,
    task: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(producer: SnapshotProducer, store: Arc<SnapshotStore>) -> Self {
        Self {
            producer: Arc::new(Mutex::new(producer)),
            store,
            task: None,
        }
    }

    /// Cancels any running schedule and starts a fresh one. Must be called
    /// from within a tokio runtime.
    pub fn start(&mut self, period: Duration) {
        self.start_with_delay(WARMUP_DELAY, period);
    }

    pub fn start_with_delay(&mut self, delay: Duration, period: Duration) {
        self.cancel();
        let producer = Arc::clone(&self.producer);
        let store = Arc::clone(&self.store);
        let period = period.max(MIN_PERIOD);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                run_tick(&producer, &store).await;
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "snapshot updates scheduled");
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("snapshot updates cancelled");
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_tick(producer: &Arc<Mutex<SnapshotProducer>>, store: &SnapshotStore) {
    let producer = Arc::clone(producer);
    let produced = tokio::task::spawn_blocking(move || {
        // a previous tick that panicked mid-produce leaves nothing half-written
        let mut producer = producer.lock().unwrap_or_else(PoisonError::into_inner);
        producer.produce()
    })
    .await;

    match produced {
        Ok(snapshot) => {
            store.publish(snapshot);
            tracing::debug!("server data updated");
        }
        Err(e) => {
            tracing::error!(error = %e, "snapshot update failed; keeping previous snapshot");
        }
    }
}
