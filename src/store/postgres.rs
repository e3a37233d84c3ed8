use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, StoreResult, WorkoutStore};
use crate::models::{
    AddAssignmentRequest, AssignmentDetail, CreateExerciseRequest, CreateWorkoutPlanRequest,
    Exercise, ExerciseAssignment, ExerciseFilter, UpdateAssignmentRequest,
    UpdateExerciseRequest, UpdateWorkoutPlanRequest, WorkoutDay, WorkoutPlan, WorkoutPlanDetail,
    WorkoutPlanFilter,
};

const EXERCISE_COLUMNS: &str =
    "id, name, description, muscle_group, equipment, image_url, created_at, updated_at";
const PLAN_COLUMNS: &str = "id, name, description, difficulty_level, goal, duration_days, active, image_url, created_by, created_at, updated_at";
const DAY_COLUMNS: &str = "id, workout_plan_id, day_name, position, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str = "id, workout_day_id, exercise_id, sets, reps, rest_time_seconds, position, created_at, updated_at";
const ASSIGNMENT_DETAIL_SELECT: &str = r#"
    SELECT a.id, a.workout_day_id, a.exercise_id, a.sets, a.reps, a.rest_time_seconds,
           a.position, a.created_at, a.updated_at, e.name AS exercise_name
    FROM workout_day_exercises a
    JOIN exercises e ON e.id = a.exercise_id
    JOIN workout_days d ON d.id = a.workout_day_id
"#;

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Name of the foreign key a failed statement tripped over, if that is why it failed
fn violated_foreign_key(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// PostgreSQL-backed store. Cascading deletes run in one transaction each.
#[derive(Debug, Clone)]
pub struct PgWorkoutStore {
    db: PgPool,
}

impl PgWorkoutStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkoutStore for PgWorkoutStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert_exercise(&self, request: &CreateExerciseRequest) -> StoreResult<Exercise> {
        let exercise = sqlx::query_as::<_, Exercise>(&format!(
            "INSERT INTO exercises (name, description, muscle_group, equipment, image_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {EXERCISE_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.muscle_group)
        .bind(&request.equipment)
        .bind(&request.image_url)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(exercise)
    }

    async fn get_exercise(&self, exercise_id: i64) -> StoreResult<Option<Exercise>> {
        let exercise = sqlx::query_as::<_, Exercise>(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = $1"
        ))
        .bind(exercise_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(exercise)
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> StoreResult<Vec<Exercise>> {
        let pagination = filter.pagination();
        let exercises = sqlx::query_as::<_, Exercise>(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises
             WHERE ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0)
               AND ($2::text IS NULL OR lower(muscle_group) = lower($2))
             ORDER BY name, id
             LIMIT $3 OFFSET $4"
        ))
        .bind(&filter.search)
        .bind(&filter.muscle_group)
        .bind(pagination.get_limit())
        .bind(pagination.get_offset())
        .fetch_all(&self.db)
        .await?;

        Ok(exercises)
    }

    async fn update_exercise(
        &self,
        exercise_id: i64,
        changes: &UpdateExerciseRequest,
    ) -> StoreResult<Option<Exercise>> {
        let exercise = sqlx::query_as::<_, Exercise>(&format!(
            "UPDATE exercises
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 muscle_group = COALESCE($4, muscle_group),
                 equipment = COALESCE($5, equipment),
                 image_url = COALESCE($6, image_url),
                 updated_at = $7
             WHERE id = $1
             RETURNING {EXERCISE_COLUMNS}"
        ))
        .bind(exercise_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.muscle_group)
        .bind(&changes.equipment)
        .bind(&changes.image_url)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(exercise)
    }

    async fn delete_exercise_if_unreferenced(&self, exercise_id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM exercises
             WHERE id = $1
               AND NOT EXISTS (SELECT 1 FROM workout_day_exercises WHERE exercise_id = $1)",
        )
        .bind(exercise_id)
        .execute(&self.db)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(true),
            Ok(_) => {
                // Nothing deleted: either no such exercise or it is still in use
                let references = self.count_exercise_references(exercise_id).await?;
                if references > 0 {
                    return Err(StoreError::StillReferenced {
                        resource: "exercise",
                        id: exercise_id,
                        references,
                    });
                }
                Ok(false)
            }
            // An assignment committed between the NOT EXISTS check and the delete
            Err(err) if violated_foreign_key(&err).is_some() => {
                let references = self.count_exercise_references(exercise_id).await?;
                Err(StoreError::StillReferenced {
                    resource: "exercise",
                    id: exercise_id,
                    references: references.max(1),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn count_exercise_references(&self, exercise_id: i64) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM workout_day_exercises WHERE exercise_id = $1",
        )
        .bind(exercise_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn insert_plan(
        &self,
        request: &CreateWorkoutPlanRequest,
        created_by: Option<Uuid>,
    ) -> StoreResult<WorkoutPlan> {
        let plan = sqlx::query_as::<_, WorkoutPlan>(&format!(
            "INSERT INTO workout_plans (name, description, difficulty_level, goal, duration_days, active, image_url, created_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.difficulty_level)
        .bind(&request.goal)
        .bind(request.duration_days)
        .bind(request.active.unwrap_or(true))
        .bind(&request.image_url)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(plan)
    }

    async fn get_plan(&self, plan_id: i64) -> StoreResult<Option<WorkoutPlan>> {
        let plan = sqlx::query_as::<_, WorkoutPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE id = $1"
        ))
        .bind(plan_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(plan)
    }

    async fn list_plans(&self, filter: &WorkoutPlanFilter) -> StoreResult<Vec<WorkoutPlan>> {
        let pagination = filter.pagination();
        let plans = sqlx::query_as::<_, WorkoutPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans
             WHERE ($1::difficulty_level IS NULL OR difficulty_level = $1)
               AND ($2::boolean IS NULL OR active = $2)
             ORDER BY id
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.difficulty_level)
        .bind(filter.active)
        .bind(pagination.get_limit())
        .bind(pagination.get_offset())
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    async fn update_plan(
        &self,
        plan_id: i64,
        changes: &UpdateWorkoutPlanRequest,
    ) -> StoreResult<Option<WorkoutPlan>> {
        let plan = sqlx::query_as::<_, WorkoutPlan>(&format!(
            "UPDATE workout_plans
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 difficulty_level = COALESCE($4, difficulty_level),
                 goal = COALESCE($5, goal),
                 duration_days = COALESCE($6, duration_days),
                 active = COALESCE($7, active),
                 image_url = COALESCE($8, image_url),
                 updated_at = $9
             WHERE id = $1
             RETURNING {PLAN_COLUMNS}"
        ))
        .bind(plan_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.difficulty_level)
        .bind(&changes.goal)
        .bind(changes.duration_days)
        .bind(changes.active)
        .bind(&changes.image_url)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(plan)
    }

    async fn delete_plan(&self, plan_id: i64) -> StoreResult<bool> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "DELETE FROM workout_day_exercises
             WHERE workout_day_id IN (SELECT id FROM workout_days WHERE workout_plan_id = $1)",
        )
        .bind(plan_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM workout_days WHERE workout_plan_id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM workout_plans WHERE id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load_plan_detail(&self, plan_id: i64) -> StoreResult<Option<WorkoutPlanDetail>> {
        let mut tx = self.db.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let plan = sqlx::query_as::<_, WorkoutPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE id = $1"
        ))
        .bind(plan_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(plan) = plan else {
            tx.commit().await?;
            return Ok(None);
        };

        let days = sqlx::query_as::<_, WorkoutDay>(&format!(
            "SELECT {DAY_COLUMNS} FROM workout_days WHERE workout_plan_id = $1 ORDER BY position, id"
        ))
        .bind(plan_id)
        .fetch_all(&mut *tx)
        .await?;

        let assignments = sqlx::query_as::<_, AssignmentDetail>(&format!(
            "{ASSIGNMENT_DETAIL_SELECT} WHERE d.workout_plan_id = $1 ORDER BY d.position, d.id, a.position, a.id"
        ))
        .bind(plan_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(WorkoutPlanDetail::assemble(plan, days, assignments)))
    }

    async fn insert_day(&self, plan_id: i64, day_name: &str) -> StoreResult<WorkoutDay> {
        let mut tx = self.db.begin().await?;

        // Row lock keeps position assignment ordered across server instances
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM workout_plans WHERE id = $1 FOR UPDATE")
            .bind(plan_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::MissingReference {
                resource: "workout plan",
                id: plan_id,
            });
        }

        let day = sqlx::query_as::<_, WorkoutDay>(&format!(
            "INSERT INTO workout_days (workout_plan_id, day_name, position, created_at, updated_at)
             VALUES ($1, $2,
                     (SELECT COALESCE(MAX(position), 0) + 1 FROM workout_days WHERE workout_plan_id = $1),
                     $3, $3)
             RETURNING {DAY_COLUMNS}"
        ))
        .bind(plan_id)
        .bind(day_name)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match violated_foreign_key(&err) {
            Some(_) => StoreError::MissingReference {
                resource: "workout plan",
                id: plan_id,
            },
            None => err.into(),
        })?;

        tx.commit().await?;
        Ok(day)
    }

    async fn get_day(&self, day_id: i64) -> StoreResult<Option<WorkoutDay>> {
        let day = sqlx::query_as::<_, WorkoutDay>(&format!(
            "SELECT {DAY_COLUMNS} FROM workout_days WHERE id = $1"
        ))
        .bind(day_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(day)
    }

    async fn rename_day(&self, day_id: i64, day_name: &str) -> StoreResult<Option<WorkoutDay>> {
        let day = sqlx::query_as::<_, WorkoutDay>(&format!(
            "UPDATE workout_days SET day_name = $2, updated_at = $3 WHERE id = $1 RETURNING {DAY_COLUMNS}"
        ))
        .bind(day_id)
        .bind(day_name)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(day)
    }

    async fn delete_day(&self, day_id: i64) -> StoreResult<bool> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM workout_day_exercises WHERE workout_day_id = $1")
            .bind(day_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM workout_days WHERE id = $1")
            .bind(day_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_assignment(&self, request: &AddAssignmentRequest) -> StoreResult<ExerciseAssignment> {
        let mut tx = self.db.begin().await?;

        let day = sqlx::query_scalar::<_, i64>("SELECT id FROM workout_days WHERE id = $1 FOR UPDATE")
            .bind(request.day_id)
            .fetch_optional(&mut *tx)
            .await?;
        if day.is_none() {
            return Err(StoreError::MissingReference {
                resource: "workout day",
                id: request.day_id,
            });
        }

        // Holds off a concurrent catalog delete until this insert commits
        let exercise = sqlx::query_scalar::<_, i64>("SELECT id FROM exercises WHERE id = $1 FOR KEY SHARE")
            .bind(request.exercise_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exercise.is_none() {
            return Err(StoreError::MissingReference {
                resource: "exercise",
                id: request.exercise_id,
            });
        }

        let assignment = sqlx::query_as::<_, ExerciseAssignment>(&format!(
            "INSERT INTO workout_day_exercises
                 (workout_day_id, exercise_id, sets, reps, rest_time_seconds, position, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5,
                     (SELECT COALESCE(MAX(position), 0) + 1 FROM workout_day_exercises WHERE workout_day_id = $1),
                     $6, $6)
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(request.day_id)
        .bind(request.exercise_id)
        .bind(request.sets)
        .bind(request.reps)
        .bind(request.rest_time_seconds)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match violated_foreign_key(&err) {
            Some(constraint) if constraint.contains("exercise_id") => StoreError::MissingReference {
                resource: "exercise",
                id: request.exercise_id,
            },
            Some(_) => StoreError::MissingReference {
                resource: "workout day",
                id: request.day_id,
            },
            None => err.into(),
        })?;

        tx.commit().await?;
        Ok(assignment)
    }

    async fn get_assignment(&self, assignment_id: i64) -> StoreResult<Option<ExerciseAssignment>> {
        let assignment = sqlx::query_as::<_, ExerciseAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM workout_day_exercises WHERE id = $1"
        ))
        .bind(assignment_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(assignment)
    }

    async fn list_day_assignments(&self, day_id: i64) -> StoreResult<Vec<AssignmentDetail>> {
        let assignments = sqlx::query_as::<_, AssignmentDetail>(&format!(
            "{ASSIGNMENT_DETAIL_SELECT} WHERE a.workout_day_id = $1 ORDER BY a.position, a.id"
        ))
        .bind(day_id)
        .fetch_all(&self.db)
        .await?;

        Ok(assignments)
    }

    async fn find_assignments(
        &self,
        day_id: i64,
        exercise_id: i64,
    ) -> StoreResult<Vec<ExerciseAssignment>> {
        let assignments = sqlx::query_as::<_, ExerciseAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM workout_day_exercises
             WHERE workout_day_id = $1 AND exercise_id = $2
             ORDER BY position, id"
        ))
        .bind(day_id)
        .bind(exercise_id)
        .fetch_all(&self.db)
        .await?;

        Ok(assignments)
    }

    async fn update_assignment(
        &self,
        assignment_id: i64,
        changes: &UpdateAssignmentRequest,
    ) -> StoreResult<Option<ExerciseAssignment>> {
        let assignment = sqlx::query_as::<_, ExerciseAssignment>(&format!(
            "UPDATE workout_day_exercises
             SET sets = COALESCE($2, sets),
                 reps = COALESCE($3, reps),
                 rest_time_seconds = COALESCE($4, rest_time_seconds),
                 updated_at = $5
             WHERE id = $1
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(assignment_id)
        .bind(changes.sets)
        .bind(changes.reps)
        .bind(changes.rest_time_seconds)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(assignment)
    }

    async fn delete_assignment(&self, assignment_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM workout_day_exercises WHERE id = $1")
            .bind(assignment_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

