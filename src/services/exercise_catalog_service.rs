use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use super::{PlanCache, ServiceError};
use crate::models::{CreateExerciseRequest, Exercise, ExerciseFilter, UpdateExerciseRequest};
use crate::store::WorkoutStore;

#[derive(Clone)]
pub struct ExerciseCatalogService {
    store: Arc<dyn WorkoutStore>,
    cache: PlanCache,
}

impl ExerciseCatalogService {
    pub fn new(store: Arc<dyn WorkoutStore>, cache: PlanCache) -> Self {
        Self { store, cache }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_exercise(&self, request: CreateExerciseRequest) -> Result<Exercise, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        let exercise = self.store.insert_exercise(&request).await?;
        info!("Created exercise {} ({})", exercise.id, exercise.name);
        Ok(exercise)
    }

    pub async fn get_exercise(&self, exercise_id: i64) -> Result<Exercise, ServiceError> {
        self.store
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("exercise", exercise_id))
    }

    pub async fn list_exercises(&self, filter: ExerciseFilter) -> Result<Vec<Exercise>, ServiceError> {
        filter
            .pagination()
            .validate()
            .map_err(|msg| ServiceError::Validation(msg.to_string()))?;

        Ok(self.store.list_exercises(&filter).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_exercise(
        &self,
        exercise_id: i64,
        request: UpdateExerciseRequest,
    ) -> Result<Exercise, ServiceError> {
        let request = request.normalized();
        request.validate()?;

        let exercise = self
            .store
            .update_exercise(exercise_id, &request)
            .await?
            .ok_or_else(|| ServiceError::not_found("exercise", exercise_id))?;

        // Plan details embed exercise names
        if request.name.is_some() {
            self.cache.invalidate_all().await;
        }

        info!("Updated exercise {}", exercise_id);
        Ok(exercise)
    }

    /// Deletes an exercise nothing references any more.
    ///
    /// The reference check and the delete are one storage step, so an
    /// assignment added concurrently either lands first and blocks the delete
    /// or finds the exercise gone.
    #[instrument(skip(self))]
    pub async fn delete_exercise(&self, exercise_id: i64) -> Result<(), ServiceError> {
        if !self.store.delete_exercise_if_unreferenced(exercise_id).await? {
            return Err(ServiceError::not_found("exercise", exercise_id));
        }

        info!("Deleted exercise {}", exercise_id);
        Ok(())
    }
}
