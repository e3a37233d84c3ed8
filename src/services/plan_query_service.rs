use std::sync::Arc;
use tracing::{debug, instrument};

use super::{PlanCache, ServiceError};
use crate::models::WorkoutPlanDetail;
use crate::store::WorkoutStore;

/// Read side: a plan with its days and their assignments, served from `PlanCache`
#[derive(Clone)]
pub struct PlanQueryService {
    store: Arc<dyn WorkoutStore>,
    cache: PlanCache,
}

impl PlanQueryService {
    pub fn new(store: Arc<dyn WorkoutStore>, cache: PlanCache) -> Self {
        Self { store, cache }
    }

    #[instrument(skip(self))]
    pub async fn get_plan_detail(&self, plan_id: i64) -> Result<WorkoutPlanDetail, ServiceError> {
        if let Some(detail) = self.cache.get(plan_id).await {
            debug!("Plan {} served from cache", plan_id);
            return Ok(detail);
        }

        let ticket = self.cache.generation(plan_id).await;
        let detail = self
            .store
            .load_plan_detail(plan_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("workout plan", plan_id))?;

        self.cache.insert(ticket, detail.clone()).await;
        Ok(detail)
    }
}
