use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, WorkoutStore};
use crate::models::{
    AddAssignmentRequest, AssignmentDetail, CreateExerciseRequest, CreateWorkoutPlanRequest,
    Exercise, ExerciseAssignment, ExerciseFilter, UpdateAssignmentRequest, UpdateExerciseRequest,
    UpdateWorkoutPlanRequest, WorkoutDay, WorkoutPlan, WorkoutPlanDetail, WorkoutPlanFilter,
};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    exercises: BTreeMap<i64, Exercise>,
    plans: BTreeMap<i64, WorkoutPlan>,
    days: BTreeMap<i64, WorkoutDay>,
    assignments: BTreeMap<i64, ExerciseAssignment>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn days_of(&self, plan_id: i64) -> Vec<WorkoutDay> {
        let mut days: Vec<WorkoutDay> = self
            .days
            .values()
            .filter(|d| d.workout_plan_id == plan_id)
            .cloned()
            .collect();
        days.sort_by_key(|d| (d.position, d.id));
        days
    }

    fn assignments_of(&self, day_id: i64) -> Vec<AssignmentDetail> {
        let mut assignments: Vec<&ExerciseAssignment> = self
            .assignments
            .values()
            .filter(|a| a.workout_day_id == day_id)
            .collect();
        assignments.sort_by_key(|a| (a.position, a.id));
        // Same rows as the inner join in the postgres backend
        assignments
            .into_iter()
            .filter_map(|a| {
                self.exercises.get(&a.exercise_id).map(|e| AssignmentDetail {
                    assignment: a.clone(),
                    exercise_name: e.name.clone(),
                })
            })
            .collect()
    }

    fn references_to(&self, exercise_id: i64) -> i64 {
        self.assignments
            .values()
            .filter(|a| a.exercise_id == exercise_id)
            .count() as i64
    }

    fn remove_day_cascade(&mut self, day_id: i64) -> bool {
        self.assignments.retain(|_, a| a.workout_day_id != day_id);
        self.days.remove(&day_id).is_some()
    }
}

/// Process-local store. One lock guards every table, so each call is atomic.
#[derive(Debug, Default)]
pub struct InMemoryWorkoutStore {
    state: RwLock<MemoryState>,
}

impl InMemoryWorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutStore for InMemoryWorkoutStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert_exercise(&self, request: &CreateExerciseRequest) -> StoreResult<Exercise> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let exercise = Exercise {
            id: state.allocate_id(),
            name: request.name.clone(),
            description: request.description.clone(),
            muscle_group: request.muscle_group.clone(),
            equipment: request.equipment.clone(),
            image_url: request.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        state.exercises.insert(exercise.id, exercise.clone());
        Ok(exercise)
    }

    async fn get_exercise(&self, exercise_id: i64) -> StoreResult<Option<Exercise>> {
        Ok(self.state.read().await.exercises.get(&exercise_id).cloned())
    }

    async fn list_exercises(&self, filter: &ExerciseFilter) -> StoreResult<Vec<Exercise>> {
        let state = self.state.read().await;
        let mut exercises: Vec<Exercise> = state
            .exercises
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(filter.pagination().apply(exercises))
    }

    async fn update_exercise(
        &self,
        exercise_id: i64,
        changes: &UpdateExerciseRequest,
    ) -> StoreResult<Option<Exercise>> {
        let mut state = self.state.write().await;
        let Some(exercise) = state.exercises.get_mut(&exercise_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            exercise.name = name.clone();
        }
        if let Some(description) = &changes.description {
            exercise.description = Some(description.clone());
        }
        if let Some(muscle_group) = &changes.muscle_group {
            exercise.muscle_group = Some(muscle_group.clone());
        }
        if let Some(equipment) = &changes.equipment {
            exercise.equipment = Some(equipment.clone());
        }
        if let Some(image_url) = &changes.image_url {
            exercise.image_url = Some(image_url.clone());
        }
        exercise.updated_at = Utc::now();
        Ok(Some(exercise.clone()))
    }

    async fn delete_exercise_if_unreferenced(&self, exercise_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if !state.exercises.contains_key(&exercise_id) {
            return Ok(false);
        }
        let references = state.references_to(exercise_id);
        if references > 0 {
            return Err(StoreError::StillReferenced {
                resource: "exercise",
                id: exercise_id,
                references,
            });
        }
        Ok(state.exercises.remove(&exercise_id).is_some())
    }

    async fn count_exercise_references(&self, exercise_id: i64) -> StoreResult<i64> {
        Ok(self.state.read().await.references_to(exercise_id))
    }

    async fn insert_plan(
        &self,
        request: &CreateWorkoutPlanRequest,
        created_by: Option<Uuid>,
    ) -> StoreResult<WorkoutPlan> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let plan = WorkoutPlan {
            id: state.allocate_id(),
            name: request.name.clone(),
            description: request.description.clone(),
            difficulty_level: request.difficulty_level,
            goal: request.goal.clone(),
            duration_days: request.duration_days,
            active: request.active.unwrap_or(true),
            image_url: request.image_url.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };
        state.plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn get_plan(&self, plan_id: i64) -> StoreResult<Option<WorkoutPlan>> {
        Ok(self.state.read().await.plans.get(&plan_id).cloned())
    }

    async fn list_plans(&self, filter: &WorkoutPlanFilter) -> StoreResult<Vec<WorkoutPlan>> {
        let state = self.state.read().await;
        let plans = state.plans.values().filter(|p| filter.matches(p)).cloned();
        Ok(filter.pagination().apply(plans))
    }

    async fn update_plan(
        &self,
        plan_id: i64,
        changes: &UpdateWorkoutPlanRequest,
    ) -> StoreResult<Option<WorkoutPlan>> {
        let mut state = self.state.write().await;
        let Some(plan) = state.plans.get_mut(&plan_id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            plan.name = name.clone();
        }
        if let Some(description) = &changes.description {
            plan.description = Some(description.clone());
        }
        if let Some(level) = changes.difficulty_level {
            plan.difficulty_level = level;
        }
        if let Some(goal) = &changes.goal {
            plan.goal = goal.clone();
        }
        if let Some(duration_days) = changes.duration_days {
            plan.duration_days = duration_days;
        }
        if let Some(active) = changes.active {
            plan.active = active;
        }
        if let Some(image_url) = &changes.image_url {
            plan.image_url = Some(image_url.clone());
        }
        plan.updated_at = Utc::now();
        Ok(Some(plan.clone()))
    }

    async fn delete_plan(&self, plan_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if state.plans.remove(&plan_id).is_none() {
            return Ok(false);
        }
        let day_ids: Vec<i64> = state
            .days
            .values()
            .filter(|d| d.workout_plan_id == plan_id)
            .map(|d| d.id)
            .collect();
        for day_id in day_ids {
            state.remove_day_cascade(day_id);
        }
        Ok(true)
    }

    async fn load_plan_detail(&self, plan_id: i64) -> StoreResult<Option<WorkoutPlanDetail>> {
        let state = self.state.read().await;
        let Some(plan) = state.plans.get(&plan_id).cloned() else {
            return Ok(None);
        };
        let days = state.days_of(plan_id);
        let assignments = days.iter().flat_map(|d| state.assignments_of(d.id)).collect();
        Ok(Some(WorkoutPlanDetail::assemble(plan, days, assignments)))
    }

    async fn insert_day(&self, plan_id: i64, day_name: &str) -> StoreResult<WorkoutDay> {
        let mut state = self.state.write().await;
        if !state.plans.contains_key(&plan_id) {
            return Err(StoreError::MissingReference {
                resource: "workout plan",
                id: plan_id,
            });
        }
        let position = state
            .days
            .values()
            .filter(|d| d.workout_plan_id == plan_id)
            .map(|d| d.position)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let day = WorkoutDay {
            id: state.allocate_id(),
            workout_plan_id: plan_id,
            day_name: day_name.to_string(),
            position,
            created_at: now,
            updated_at: now,
        };
        state.days.insert(day.id, day.clone());
        Ok(day)
    }

    async fn get_day(&self, day_id: i64) -> StoreResult<Option<WorkoutDay>> {
        Ok(self.state.read().await.days.get(&day_id).cloned())
    }

    async fn rename_day(&self, day_id: i64, day_name: &str) -> StoreResult<Option<WorkoutDay>> {
        let mut state = self.state.write().await;
        let Some(day) = state.days.get_mut(&day_id) else {
            return Ok(None);
        };
        day.day_name = day_name.to_string();
        day.updated_at = Utc::now();
        Ok(Some(day.clone()))
    }

    async fn delete_day(&self, day_id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.remove_day_cascade(day_id))
    }

    async fn insert_assignment(&self, request: &AddAssignmentRequest) -> StoreResult<ExerciseAssignment> {
        let mut state = self.state.write().await;
        if !state.days.contains_key(&request.day_id) {
            return Err(StoreError::MissingReference {
                resource: "workout day",
                id: request.day_id,
            });
        }
        if !state.exercises.contains_key(&request.exercise_id) {
            return Err(StoreError::MissingReference {
                resource: "exercise",
                id: request.exercise_id,
            });
        }
        let position = state
            .assignments
            .values()
            .filter(|a| a.workout_day_id == request.day_id)
            .map(|a| a.position)
            .max()
            .unwrap_or(0)
            + 1;
        let now = Utc::now();
        let assignment = ExerciseAssignment {
            id: state.allocate_id(),
            workout_day_id: request.day_id,
            exercise_id: request.exercise_id,
            sets: request.sets,
            reps: request.reps,
            rest_time_seconds: request.rest_time_seconds,
            position,
            created_at: now,
            updated_at: now,
        };
        state.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn get_assignment(&self, assignment_id: i64) -> StoreResult<Option<ExerciseAssignment>> {
        Ok(self.state.read().await.assignments.get(&assignment_id).cloned())
    }

    async fn list_day_assignments(&self, day_id: i64) -> StoreResult<Vec<AssignmentDetail>> {
        Ok(self.state.read().await.assignments_of(day_id))
    }

    async fn find_assignments(
        &self,
        day_id: i64,
        exercise_id: i64,
    ) -> StoreResult<Vec<ExerciseAssignment>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .values()
            .filter(|a| a.workout_day_id == day_id && a.exercise_id == exercise_id)
            .cloned()
            .collect())
    }

    async fn update_assignment(
        &self,
        assignment_id: i64,
        changes: &UpdateAssignmentRequest,
    ) -> StoreResult<Option<ExerciseAssignment>> {
        let mut state = self.state.write().await;
        let Some(assignment) = state.assignments.get_mut(&assignment_id) else {
            return Ok(None);
        };
        if let Some(sets) = changes.sets {
            assignment.sets = sets;
        }
        if let Some(reps) = changes.reps {
            assignment.reps = reps;
        }
        if let Some(rest) = changes.rest_time_seconds {
            assignment.rest_time_seconds = rest;
        }
        assignment.updated_at = Utc::now();
        Ok(Some(assignment.clone()))
    }

    async fn delete_assignment(&self, assignment_id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.assignments.remove(&assignment_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DifficultyLevel;

    fn plan_request() -> CreateWorkoutPlanRequest {
        CreateWorkoutPlanRequest {
            name: "Push Pull Legs".to_string(),
            description: None,
            difficulty_level: DifficultyLevel::Beginner,
            goal: "Hypertrophy".to_string(),
            duration_days: 21,
            active: None,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_days_get_increasing_positions() {
        let store = InMemoryWorkoutStore::new();
        let plan = store.insert_plan(&plan_request(), None).await.unwrap();
        assert!(plan.active);

        let first = store.insert_day(plan.id, "Push").await.unwrap();
        let second = store.insert_day(plan.id, "Pull").await.unwrap();
        assert_eq!((first.position, second.position), (1, 2));

        store.delete_day(first.id).await.unwrap();
        let third = store.insert_day(plan.id, "Legs").await.unwrap();
        assert_eq!(third.position, 3);

        let detail = store.load_plan_detail(plan.id).await.unwrap().unwrap();
        let names: Vec<String> = detail.days.into_iter().map(|d| d.day.day_name).collect();
        assert_eq!(names, vec!["Pull", "Legs"]);
    }

    #[tokio::test]
    async fn test_delete_plan_cascades() {
        let store = InMemoryWorkoutStore::new();
        let plan = store.insert_plan(&plan_request(), None).await.unwrap();
        let day = store.insert_day(plan.id, "Push").await.unwrap();
        let exercise = store
            .insert_exercise(&CreateExerciseRequest {
                name: "Bench Press".to_string(),
                description: None,
                muscle_group: None,
                equipment: None,
                image_url: None,
            })
            .await
            .unwrap();
        let assignment = store
            .insert_assignment(&AddAssignmentRequest {
                day_id: day.id,
                exercise_id: exercise.id,
                sets: 3,
                reps: 8,
                rest_time_seconds: 90,
            })
            .await
            .unwrap();

        assert!(store.delete_plan(plan.id).await.unwrap());
        assert!(store.get_day(day.id).await.unwrap().is_none());
        assert!(store.get_assignment(assignment.id).await.unwrap().is_none());
        assert_eq!(store.count_exercise_references(exercise.id).await.unwrap(), 0);
        assert!(!store.delete_plan(plan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_inserts_recheck_parents_under_the_write_lock() {
        let store = InMemoryWorkoutStore::new();
        let plan = store.insert_plan(&plan_request(), None).await.unwrap();
        let day = store.insert_day(plan.id, "Push").await.unwrap();

        let err = store
            .insert_assignment(&AddAssignmentRequest {
                day_id: day.id,
                exercise_id: 999,
                sets: 3,
                reps: 8,
                rest_time_seconds: 60,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference { resource: "exercise", id: 999 }
        ));

        let err = store.insert_day(12_345, "Orphan").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::MissingReference { resource: "workout plan", .. }
        ));
    }

    #[tokio::test]
    async fn test_referenced_exercise_survives_delete() {
        let store = InMemoryWorkoutStore::new();
        let plan = store.insert_plan(&plan_request(), None).await.unwrap();
        let day = store.insert_day(plan.id, "Legs").await.unwrap();
        let exercise = store
            .insert_exercise(&CreateExerciseRequest {
                name: "Squat".to_string(),
                description: None,
                muscle_group: None,
                equipment: None,
                image_url: None,
            })
            .await
            .unwrap();
        store
            .insert_assignment(&AddAssignmentRequest {
                day_id: day.id,
                exercise_id: exercise.id,
                sets: 5,
                reps: 5,
                rest_time_seconds: 180,
            })
            .await
            .unwrap();

        let err = store
            .delete_exercise_if_unreferenced(exercise.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StillReferenced { references: 1, .. }));
        assert!(store.get_exercise(exercise.id).await.unwrap().is_some());

        assert!(store.delete_day(day.id).await.unwrap());
        assert!(store.delete_exercise_if_unreferenced(exercise.id).await.unwrap());
        assert!(!store.delete_exercise_if_unreferenced(exercise.id).await.unwrap());
    }
}
