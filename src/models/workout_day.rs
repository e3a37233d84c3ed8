use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::normalize_name;

/// A named subdivision of a plan. Its plan never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    pub id: i64,
    #[serde(rename = "workoutId")]
    pub workout_plan_id: i64,
    pub day_name: String,
    /// 1-based position within the plan; gaps are left behind by deletions
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDayRequest {
    #[validate(length(min = 1, max = 120, message = "Day name must be between 1 and 120 characters"))]
    pub day_name: String,
}

impl WorkoutDayRequest {
    pub fn new(day_name: impl Into<String>) -> Self {
        Self {
            day_name: day_name.into(),
        }
    }

    pub fn normalized(mut self) -> Self {
        self.day_name = normalize_name(&self.day_name);
        self
    }
}
