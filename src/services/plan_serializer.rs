use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Single-writer queue per plan.
///
/// Every mutation of a plan's structure holds that plan's guard from its
/// existence checks through its write, so commands for one plan apply in the
/// order they acquire the guard. `tokio::sync::Mutex` hands the lock out in
/// FIFO order. Different plans never contend.
#[derive(Debug, Clone, Default)]
pub struct PlanWriteSerializer {
    locks: Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>,
}

pub type PlanWriteGuard = OwnedMutexGuard<()>;

impl PlanWriteSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, plan_id: i64) -> PlanWriteGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries nobody holds or waits on can go
            locks.retain(|id, lock| *id == plan_id || Arc::strong_count(lock) > 1);
            locks
                .entry(plan_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of plans with a live lock entry
    #[cfg(test)]
    fn tracked_plans(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
