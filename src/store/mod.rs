// Storage backends for the exercise catalog and workout plan composition

pub mod memory;
pub mod postgres;

pub use memory::InMemoryWorkoutStore;
pub use postgres::PgWorkoutStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AddAssignmentRequest, AssignmentDetail, CreateExerciseRequest, CreateWorkoutPlanRequest,
    Exercise, ExerciseAssignment, ExerciseFilter, UpdateAssignmentRequest, UpdateExerciseRequest,
    UpdateWorkoutPlanRequest, WorkoutDay, WorkoutPlan, WorkoutPlanDetail, WorkoutPlanFilter,
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{resource} {id} does not exist")]
    MissingReference { resource: &'static str, id: i64 },
    #[error("{resource} {id} is still referenced by {references} assignments")]
    StillReferenced {
        resource: &'static str,
        id: i64,
        references: i64,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for catalog exercises, plans, days and assignments.
///
/// Implementations must make `delete_day` and `delete_plan` atomic with their
/// cascades, and `load_plan_detail` must read one consistent snapshot.
/// Request validation belongs to the services. Referential checks that guard a
/// write (parent rows on insert, references on catalog delete) happen inside
/// the same atomic step as the write.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn insert_exercise(&self, request: &CreateExerciseRequest) -> StoreResult<Exercise>;
    async fn get_exercise(&self, exercise_id: i64) -> StoreResult<Option<Exercise>>;
    async fn list_exercises(&self, filter: &ExerciseFilter) -> StoreResult<Vec<Exercise>>;
    async fn update_exercise(
        &self,
        exercise_id: i64,
        changes: &UpdateExerciseRequest,
    ) -> StoreResult<Option<Exercise>>;
    /// Deletes the exercise unless an assignment references it, as one atomic step.
    /// Returns false if the exercise did not exist; fails with `StillReferenced` otherwise.
    async fn delete_exercise_if_unreferenced(&self, exercise_id: i64) -> StoreResult<bool>;
    async fn count_exercise_references(&self, exercise_id: i64) -> StoreResult<i64>;

    async fn insert_plan(
        &self,
        request: &CreateWorkoutPlanRequest,
        created_by: Option<Uuid>,
    ) -> StoreResult<WorkoutPlan>;
    async fn get_plan(&self, plan_id: i64) -> StoreResult<Option<WorkoutPlan>>;
    async fn list_plans(&self, filter: &WorkoutPlanFilter) -> StoreResult<Vec<WorkoutPlan>>;
    async fn update_plan(
        &self,
        plan_id: i64,
        changes: &UpdateWorkoutPlanRequest,
    ) -> StoreResult<Option<WorkoutPlan>>;
    /// Removes the plan, its days and their assignments. Returns false if the plan did not exist.
    async fn delete_plan(&self, plan_id: i64) -> StoreResult<bool>;
    async fn load_plan_detail(&self, plan_id: i64) -> StoreResult<Option<WorkoutPlanDetail>>;

    /// Appends a day at the end of the plan. Fails with `MissingReference` if the plan is gone.
    async fn insert_day(&self, plan_id: i64, day_name: &str) -> StoreResult<WorkoutDay>;
    async fn get_day(&self, day_id: i64) -> StoreResult<Option<WorkoutDay>>;
    async fn rename_day(&self, day_id: i64, day_name: &str) -> StoreResult<Option<WorkoutDay>>;
    /// Removes the day and its assignments. Returns false if the day did not exist.
    async fn delete_day(&self, day_id: i64) -> StoreResult<bool>;

    /// Appends an assignment at the end of its day. Fails with `MissingReference`
    /// if the day or the exercise is gone at the moment of the write.
    async fn insert_assignment(&self, request: &AddAssignmentRequest) -> StoreResult<ExerciseAssignment>;
    async fn get_assignment(&self, assignment_id: i64) -> StoreResult<Option<ExerciseAssignment>>;
    async fn list_day_assignments(&self, day_id: i64) -> StoreResult<Vec<AssignmentDetail>>;
    async fn find_assignments(
        &self,
        day_id: i64,
        exercise_id: i64,
    ) -> StoreResult<Vec<ExerciseAssignment>>;
    async fn update_assignment(
        &self,
        assignment_id: i64,
        changes: &UpdateAssignmentRequest,
    ) -> StoreResult<Option<ExerciseAssignment>>;
    async fn delete_assignment(&self, assignment_id: i64) -> StoreResult<bool>;
}
