//! Holder of the current snapshot. Readers never lock and never see a torn value.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::model::Snapshot;

pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Replaces the visible snapshot in one atomic pointer swap.
    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }
}
