use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::normalize_name;
use super::pagination::PaginationQuery;
use super::{AssignmentDetail, WorkoutDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "difficulty_level")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub difficulty_level: DifficultyLevel,
    pub goal: String,
    pub duration_days: i32,
    pub active: bool,
    pub image_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutPlanRequest {
    #[validate(length(min = 1, max = 120, message = "Plan name must be between 1 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description cannot be longer than 2000 characters"))]
    pub description: Option<String>,
    pub difficulty_level: DifficultyLevel,
    #[validate(length(max = 255, message = "Goal cannot be longer than 255 characters"))]
    pub goal: String,
    #[validate(range(min = 1, message = "Duration must be at least 1 day"))]
    pub duration_days: i32,
    pub active: Option<bool>,
    #[validate(length(max = 500, message = "Image URL cannot be longer than 500 characters"))]
    pub image_url: Option<String>,
}

impl CreateWorkoutPlanRequest {
    pub fn normalized(mut self) -> Self {
        self.name = normalize_name(&self.name);
        self.goal = self.goal.trim().to_string();
        self
    }
}

/// Partial update; `null` and absent fields keep the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkoutPlanRequest {
    #[validate(length(min = 1, max = 120, message = "Plan name must be between 1 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description cannot be longer than 2000 characters"))]
    pub description: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    #[validate(length(max = 255, message = "Goal cannot be longer than 255 characters"))]
    pub goal: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least 1 day"))]
    pub duration_days: Option<i32>,
    pub active: Option<bool>,
    #[validate(length(max = 500, message = "Image URL cannot be longer than 500 characters"))]
    pub image_url: Option<String>,
}

impl UpdateWorkoutPlanRequest {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| normalize_name(&name));
        self.goal = self.goal.map(|goal| goal.trim().to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanFilter {
    pub difficulty_level: Option<DifficultyLevel>,
    pub active: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl WorkoutPlanFilter {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub fn matches(&self, plan: &WorkoutPlan) -> bool {
        self.difficulty_level.map_or(true, |level| plan.difficulty_level == level)
            && self.active.map_or(true, |active| plan.active == active)
    }
}

/// A plan with its days and each day's assignments, as served by `GET /workouts/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanDetail {
    #[serde(flatten)]
    pub plan: WorkoutPlan,
    pub days: Vec<WorkoutDayDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDayDetail {
    #[serde(flatten)]
    pub day: WorkoutDay,
    pub exercises: Vec<AssignmentDetail>,
}

impl WorkoutPlanDetail {
    /// Group a plan snapshot into nested form.
    ///
    /// Days keep the order they are given in, and so do the assignments within
    /// each day. Assignments whose day is not in `days` are dropped.
    pub fn assemble(
        plan: WorkoutPlan,
        days: Vec<WorkoutDay>,
        assignments: Vec<AssignmentDetail>,
    ) -> Self {
        let mut by_day: HashMap<i64, Vec<AssignmentDetail>> = HashMap::new();
        for assignment in assignments {
            by_day
                .entry(assignment.assignment.workout_day_id)
                .or_default()
                .push(assignment);
        }

        let days = days
            .into_iter()
            .map(|day| WorkoutDayDetail {
                exercises: by_day.remove(&day.id).unwrap_or_default(),
                day,
            })
            .collect();

        Self { plan, days }
    }
}
