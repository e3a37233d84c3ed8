use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{PlanCache, PlanWriteSerializer, ServiceError};
use crate::models::{CreateWorkoutPlanRequest, UpdateWorkoutPlanRequest, WorkoutPlan, WorkoutPlanFilter};
use crate::store::WorkoutStore;

/// Plan-level CRUD. Day and assignment changes go through `CompositionService`.
#[derive(Clone)]
pub struct WorkoutPlanService {
    store: Arc<dyn WorkoutStore>,
    serializer: PlanWriteSerializer,
    cache: PlanCache,
}

impl WorkoutPlanService {
    pub fn new(store: Arc<dyn WorkoutStore>, serializer: PlanWriteSerializer, cache: PlanCache) -> Self {
        Self {
            store,
            serializer,
            cache,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_plan(
        &self,
        request: CreateWorkoutPlanRequest,
        created_by: Option<Uuid>,
    ) -> Result<WorkoutPlan, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        let plan = self.store.insert_plan(&request, created_by).await?;
        info!("Created workout plan {} ({})", plan.id, plan.name);
        Ok(plan)
    }

    pub async fn get_plan(&self, plan_id: i64) -> Result<WorkoutPlan, ServiceError> {
        self.store
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("workout plan", plan_id))
    }

    pub async fn list_plans(&self, filter: WorkoutPlanFilter) -> Result<Vec<WorkoutPlan>, ServiceError> {
        filter
            .pagination()
            .validate()
            .map_err(|msg| ServiceError::Validation(msg.to_string()))?;

        Ok(self.store.list_plans(&filter).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_plan(
        &self,
        plan_id: i64,
        request: UpdateWorkoutPlanRequest,
    ) -> Result<WorkoutPlan, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        let _guard = self.serializer.acquire(plan_id).await;
        let plan = self
            .store
            .update_plan(plan_id, &request)
            .await?
            .ok_or_else(|| ServiceError::not_found("workout plan", plan_id))?;
        self.cache.invalidate(plan_id).await;

        info!("Updated workout plan {}", plan_id);
        Ok(plan)
    }

    /// Deletes the plan together with all of its days and their assignments
    #[instrument(skip(self))]
    pub async fn delete_plan(&self, plan_id: i64) -> Result<(), ServiceError> {
        let _guard = self.serializer.acquire(plan_id).await;
        if !self.store.delete_plan(plan_id).await? {
            return Err(ServiceError::not_found("workout plan", plan_id));
        }
        self.cache.evict(plan_id).await;

        info!("Deleted workout plan {} with its days", plan_id);
        Ok(())
    }
}
