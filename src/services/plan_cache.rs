use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::WorkoutPlanDetail;

#[derive(Debug)]
struct CachedPlan {
    detail: WorkoutPlanDetail,
    cached_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<i64, CachedPlan>,
    generations: HashMap<i64, u64>,
    epoch: u64,
}

impl CacheState {
    // Both counters only grow, so any invalidation changes the sum
    fn generation(&self, plan_id: i64) -> u64 {
        self.epoch + self.generations.get(&plan_id).copied().unwrap_or(0)
    }
}

/// Assembled plan details keyed by plan id, refetched after every write.
///
/// Writers call `invalidate` once their change is stored. Readers take a
/// `generation` ticket before loading from storage and hand it back to
/// `insert`; a ticket issued before an invalidation is refused, so a slow read
/// can never park a pre-write snapshot in the cache.
#[derive(Debug, Clone)]
pub struct PlanCache {
    state: Arc<RwLock<CacheState>>,
    ttl: Duration,
}

impl PlanCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, plan_id: i64) -> Option<WorkoutPlanDetail> {
        if !self.is_enabled() {
            return None;
        }
        let state = self.state.read().await;
        state
            .entries
            .get(&plan_id)
            .filter(|entry| entry.cached_at.elapsed() < self.ttl)
            .map(|entry| entry.detail.clone())
    }

    pub async fn generation(&self, plan_id: i64) -> u64 {
        self.state.read().await.generation(plan_id)
    }

    /// Store a snapshot loaded under `generation`. Returns whether it was kept.
    pub async fn insert(&self, generation: u64, detail: WorkoutPlanDetail) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let plan_id = detail.plan.id;
        let mut state = self.state.write().await;
        if state.generation(plan_id) != generation {
            debug!("Discarding stale snapshot of plan {}", plan_id);
            return false;
        }
        let ttl = self.ttl;
        state.entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);
        state.entries.insert(
            plan_id,
            CachedPlan {
                detail,
                cached_at: Instant::now(),
            },
        );
        debug!("Cached plan {} ({} entries)", plan_id, state.entries.len());
        true
    }

    pub async fn invalidate(&self, plan_id: i64) {
        let mut state = self.state.write().await;
        state.entries.remove(&plan_id);
        *state.generations.entry(plan_id).or_insert(0) += 1;
        debug!("Invalidated cached plan {}", plan_id);
    }

    /// Forget a deleted plan entirely, including its generation counter.
    ///
    /// The counter folds into the epoch, so every ticket issued before this
    /// call, for this plan or any other, stays below the new generations.
    pub async fn evict(&self, plan_id: i64) {
        let mut state = self.state.write().await;
        state.entries.remove(&plan_id);
        let generation = state.generations.remove(&plan_id).unwrap_or(0);
        state.epoch += generation + 1;
        debug!("Evicted deleted plan {}", plan_id);
    }

    /// Drop every entry, e.g. after a catalog change that shows up in all plans
    pub async fn invalidate_all(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.epoch += 1;
        debug!("Invalidated all cached plans");
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    #[cfg(test)]
    async fn tracked_generations(&self) -> usize {
        self.state.read().await.generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DifficultyLevel, WorkoutPlan};
    use chrono::Utc;

    fn detail(plan_id: i64, name: &str) -> WorkoutPlanDetail {
        WorkoutPlanDetail {
            plan: WorkoutPlan {
                id: plan_id,
                name: name.to_string(),
                description: None,
                difficulty_level: DifficultyLevel::Advanced,
                goal: "Power".to_string(),
                duration_days: 14,
                active: true,
                image_url: None,
                created_by: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            days: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_hit_after_insert_and_miss_after_invalidate() {
        let cache = PlanCache::new(Duration::from_secs(60));
        let ticket = cache.generation(1).await;
        assert!(cache.insert(ticket, detail(1, "Original")).await);
        assert_eq!(cache.get(1).await.unwrap().plan.name, "Original");

        cache.invalidate(1).await;
        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_stale_ticket_is_refused() {
        let cache = PlanCache::new(Duration::from_secs(60));
        let ticket = cache.generation(1).await;

        // A write lands while the read is in flight
        cache.invalidate(1).await;

        assert!(!cache.insert(ticket, detail(1, "Before write")).await);
        assert!(cache.get(1).await.is_none());

        let fresh = cache.generation(1).await;
        assert!(cache.insert(fresh, detail(1, "After write")).await);
        assert_eq!(cache.get(1).await.unwrap().plan.name, "After write");
    }

    #[tokio::test]
    async fn test_invalidation_is_per_plan() {
        let cache = PlanCache::new(Duration::from_secs(60));
        cache.insert(0, detail(1, "One")).await;
        cache.insert(0, detail(2, "Two")).await;

        cache.invalidate(1).await;
        assert!(cache.get(1).await.is_none());
        assert!(cache.get(2).await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_refuses_older_tickets() {
        let cache = PlanCache::new(Duration::from_secs(60));
        cache.insert(0, detail(1, "One")).await;
        let ticket = cache.generation(2).await;

        cache.invalidate_all().await;

        assert_eq!(cache.len().await, 0);
        assert!(!cache.insert(ticket, detail(2, "Two")).await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_served() {
        let cache = PlanCache::new(Duration::from_millis(10));
        cache.insert(0, detail(1, "Short lived")).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache = PlanCache::new(Duration::ZERO);
        assert!(!cache.is_enabled());
        assert!(!cache.insert(0, detail(1, "Ignored")).await);
        assert!(cache.get(1).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_evicted_plan_leaves_no_state_and_refuses_old_tickets() {
        let cache = PlanCache::new(Duration::from_secs(60));
        cache.invalidate(1).await;
        cache.invalidate(1).await;
        let old_ticket = cache.generation(1).await;
        cache.insert(old_ticket, detail(1, "Doomed")).await;

        cache.evict(1).await;

        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.tracked_generations().await, 0);
        assert!(!cache.insert(old_ticket, detail(1, "Resurrected")).await);
        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_pruned_on_insert() {
        let cache = PlanCache::new(Duration::from_millis(10));
        cache.insert(0, detail(1, "Old")).await;
        tokio::time::sleep(Duration::from_millis(25)).await;

        cache.insert(0, detail(2, "New")).await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.get(2).await.is_some());
    }
}
