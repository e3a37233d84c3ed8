use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::normalize_name;
use super::pagination::PaginationQuery;

/// Catalog exercise definition. Assignments reference these by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 120, message = "Exercise name must be between 1 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description cannot be longer than 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 60, message = "Muscle group cannot be longer than 60 characters"))]
    pub muscle_group: Option<String>,
    #[validate(length(max = 60, message = "Equipment cannot be longer than 60 characters"))]
    pub equipment: Option<String>,
    #[validate(length(max = 500, message = "Image URL cannot be longer than 500 characters"))]
    pub image_url: Option<String>,
}

impl CreateExerciseRequest {
    pub fn normalized(mut self) -> Self {
        self.name = normalize_name(&self.name);
        self
    }
}

/// Partial update. An absent field and an explicit `null` both keep the
/// stored value; optional text cannot be cleared once set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExerciseRequest {
    #[validate(length(min = 1, max = 120, message = "Exercise name must be between 1 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description cannot be longer than 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 60, message = "Muscle group cannot be longer than 60 characters"))]
    pub muscle_group: Option<String>,
    #[validate(length(max = 60, message = "Equipment cannot be longer than 60 characters"))]
    pub equipment: Option<String>,
    #[validate(length(max = 500, message = "Image URL cannot be longer than 500 characters"))]
    pub image_url: Option<String>,
}

impl UpdateExerciseRequest {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| normalize_name(&name));
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseFilter {
    /// Case-insensitive substring match on the exercise name
    pub search: Option<String>,
    pub muscle_group: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ExerciseFilter {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Whether an exercise passes the name and muscle group filters (pagination aside)
    pub fn matches(&self, exercise: &Exercise) -> bool {
        let search_ok = match &self.search {
            Some(term) => exercise.name.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        };
        let group_ok = match &self.muscle_group {
            Some(group) => exercise
                .muscle_group
                .as_deref()
                .is_some_and(|g| g.eq_ignore_ascii_case(group)),
            None => true,
        };
        search_ok && group_ok
    }
}
