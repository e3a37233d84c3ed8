use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::{PlanCache, PlanWriteGuard, PlanWriteSerializer, ServiceError};
use crate::models::{
    AddAssignmentRequest, ExerciseAssignment, RemoveAssignmentQuery, UpdateAssignmentRequest,
    WorkoutDay, WorkoutDayDetail, WorkoutDayRequest,
};
use crate::store::WorkoutStore;

/// Structural changes to a plan's days and exercise assignments.
///
/// Each command validates its request first, then takes the target plan's
/// write guard, checks existence and writes. The plan's cached detail is
/// invalidated after every successful write. Commands are not idempotent:
/// creating the same day twice yields two days.
#[derive(Clone)]
pub struct CompositionService {
    store: Arc<dyn WorkoutStore>,
    serializer: PlanWriteSerializer,
    cache: PlanCache,
}

impl CompositionService {
    pub fn new(store: Arc<dyn WorkoutStore>, serializer: PlanWriteSerializer, cache: PlanCache) -> Self {
        Self {
            store,
            serializer,
            cache,
        }
    }

    async fn require_day(&self, day_id: i64) -> Result<WorkoutDay, ServiceError> {
        self.store
            .get_day(day_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("workout day", day_id))
    }

    async fn require_assignment(&self, assignment_id: i64) -> Result<ExerciseAssignment, ServiceError> {
        self.store
            .get_assignment(assignment_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("exercise assignment", assignment_id))
    }

    /// Resolve the plan owning `day_id` and take its write guard.
    ///
    /// A day never moves between plans, so the plan id read before locking
    /// stays valid; the day itself may be gone by the time the guard is held.
    async fn lock_day_plan(&self, day_id: i64) -> Result<(WorkoutDay, PlanWriteGuard), ServiceError> {
        let day = self.require_day(day_id).await?;
        let guard = self.serializer.acquire(day.workout_plan_id).await;
        Ok((day, guard))
    }

    #[instrument(skip(self, request))]
    pub async fn create_day(&self, plan_id: i64, request: WorkoutDayRequest) -> Result<WorkoutDay, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        let _guard = self.serializer.acquire(plan_id).await;
        // Fails with NotFound if the plan is gone by now
        let day = self.store.insert_day(plan_id, &request.day_name).await?;
        self.cache.invalidate(plan_id).await;

        info!("Added day {} '{}' to plan {}", day.id, day.day_name, plan_id);
        Ok(day)
    }

    pub async fn get_day(&self, day_id: i64) -> Result<WorkoutDayDetail, ServiceError> {
        let day = self.require_day(day_id).await?;
        let exercises = self.store.list_day_assignments(day_id).await?;
        Ok(WorkoutDayDetail { day, exercises })
    }

    #[instrument(skip(self, request))]
    pub async fn rename_day(&self, day_id: i64, request: WorkoutDayRequest) -> Result<WorkoutDay, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        let (day, _guard) = self.lock_day_plan(day_id).await?;
        let renamed = self
            .store
            .rename_day(day_id, &request.day_name)
            .await?
            .ok_or_else(|| ServiceError::not_found("workout day", day_id))?;
        self.cache.invalidate(day.workout_plan_id).await;

        info!("Renamed day {} to '{}'", day_id, renamed.day_name);
        Ok(renamed)
    }

    /// Deletes the day and every assignment on it in one storage operation
    #[instrument(skip(self))]
    pub async fn delete_day(&self, day_id: i64) -> Result<(), ServiceError> {
        let (day, _guard) = self.lock_day_plan(day_id).await?;
        if !self.store.delete_day(day_id).await? {
            return Err(ServiceError::not_found("workout day", day_id));
        }
        self.cache.invalidate(day.workout_plan_id).await;

        info!("Deleted day {} from plan {}", day_id, day.workout_plan_id);
        Ok(())
    }

    #[instrument(skip(self, request), fields(day_id = request.day_id, exercise_id = request.exercise_id))]
    pub async fn add_assignment(&self, request: AddAssignmentRequest) -> Result<ExerciseAssignment, ServiceError> {
        request.validate()?;

        let (day, _guard) = self.lock_day_plan(request.day_id).await?;
        // The store re-checks the day and the exercise atomically with the insert;
        // catalog deletes do not take plan guards.
        let assignment = self.store.insert_assignment(&request).await?;
        self.cache.invalidate(day.workout_plan_id).await;

        info!(
            "Assigned exercise {} to day {} as {} ({}x{}, {}s rest)",
            assignment.exercise_id,
            assignment.workout_day_id,
            assignment.id,
            assignment.sets,
            assignment.reps,
            assignment.rest_time_seconds
        );
        Ok(assignment)
    }

    pub async fn get_assignment(&self, assignment_id: i64) -> Result<ExerciseAssignment, ServiceError> {
        self.require_assignment(assignment_id).await
    }

    /// Partial update; fields left out of the request keep their values
    #[instrument(skip(self, request))]
    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        request: UpdateAssignmentRequest,
    ) -> Result<ExerciseAssignment, ServiceError> {
        request.validate()?;

        let assignment = self.require_assignment(assignment_id).await?;
        let (day, _guard) = self.lock_day_plan(assignment.workout_day_id).await?;
        if request.is_empty() {
            return self.require_assignment(assignment_id).await;
        }

        let updated = self
            .store
            .update_assignment(assignment_id, &request)
            .await?
            .ok_or_else(|| ServiceError::not_found("exercise assignment", assignment_id))?;
        self.cache.invalidate(day.workout_plan_id).await;

        info!("Updated assignment {}", assignment_id);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn remove_assignment_by_id(&self, assignment_id: i64) -> Result<(), ServiceError> {
        let assignment = self.require_assignment(assignment_id).await?;
        let (day, _guard) = self.lock_day_plan(assignment.workout_day_id).await?;
        if !self.store.delete_assignment(assignment_id).await? {
            return Err(ServiceError::not_found("exercise assignment", assignment_id));
        }
        self.cache.invalidate(day.workout_plan_id).await;

        info!("Removed assignment {} from day {}", assignment_id, day.id);
        Ok(())
    }

    /// Legacy removal keyed by (day, exercise, plan).
    ///
    /// Refuses to pick a row when the exercise appears on the day more than
    /// once; callers must then remove by assignment id.
    #[instrument(skip(self))]
    pub async fn remove_assignment(&self, key: RemoveAssignmentQuery) -> Result<(), ServiceError> {
        warn!(
            "Deprecated removal by (day {}, exercise {}, plan {}); remove by assignment id instead",
            key.day_id, key.exercise_id, key.workout_id
        );

        let _guard = self.serializer.acquire(key.workout_id).await;
        let day = self.require_day(key.day_id).await?;
        if day.workout_plan_id != key.workout_id {
            return Err(ServiceError::not_found("workout day", key.day_id));
        }

        let matches = self.store.find_assignments(key.day_id, key.exercise_id).await?;
        let assignment = match matches.as_slice() {
            [] => return Err(ServiceError::not_found("assignment of exercise", key.exercise_id)),
            [single] => single,
            many => {
                let ids: Vec<String> = many.iter().map(|a| a.id.to_string()).collect();
                return Err(ServiceError::Conflict(format!(
                    "exercise {} appears {} times on day {} (assignments {}); remove by assignment id",
                    key.exercise_id,
                    many.len(),
                    key.day_id,
                    ids.join(", ")
                )));
            }
        };

        if !self.store.delete_assignment(assignment.id).await? {
            return Err(ServiceError::not_found("exercise assignment", assignment.id));
        }
        self.cache.invalidate(key.workout_id).await;

        info!("Removed assignment {} from day {}", assignment.id, key.day_id);
        Ok(())
    }
}
