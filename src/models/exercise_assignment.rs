use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// One catalog exercise placed on a workout day with its set/rep/rest scheme.
///
/// The same exercise may appear on a day more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAssignment {
    pub id: i64,
    #[serde(rename = "dayId")]
    pub workout_day_id: i64,
    pub exercise_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub rest_time_seconds: i32,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment joined with the referenced catalog exercise's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub assignment: ExerciseAssignment,
    pub exercise_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddAssignmentRequest {
    pub day_id: i64,
    pub exercise_id: i64,
    #[validate(range(min = 1, message = "Sets must be a positive integer"))]
    pub sets: i32,
    #[validate(range(min = 1, message = "Reps must be a positive integer"))]
    pub reps: i32,
    #[serde(rename = "restTime", alias = "restTimeSeconds")]
    #[validate(range(min = 0, message = "Rest time cannot be negative"))]
    pub rest_time_seconds: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[validate(range(min = 1, message = "Sets must be a positive integer"))]
    pub sets: Option<i32>,
    #[validate(range(min = 1, message = "Reps must be a positive integer"))]
    pub reps: Option<i32>,
    #[serde(rename = "restTime", alias = "restTimeSeconds")]
    #[validate(range(min = 0, message = "Rest time cannot be negative"))]
    pub rest_time_seconds: Option<i32>,
}

impl UpdateAssignmentRequest {
    pub fn is_empty(&self) -> bool {
        self.sets.is_none() && self.reps.is_none() && self.rest_time_seconds.is_none()
    }
}

/// Legacy removal key: `DELETE /workout-day-exercises?dayId=..&exerciseId=..&workoutId=..`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAssignmentQuery {
    pub day_id: i64,
    pub exercise_id: i64,
    pub workout_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sets: i32, reps: i32, rest: i32) -> AddAssignmentRequest {
        AddAssignmentRequest {
            day_id: 10,
            exercise_id: 5,
            sets,
            reps,
            rest_time_seconds: rest,
        }
    }

    #[test]
    fn test_assignment_parameter_validation() {
        assert!(request(3, 10, 60).validate().is_ok());
        assert!(request(3, 10, 0).validate().is_ok());
        assert!(request(0, 10, 60).validate().is_err());
        assert!(request(-1, 10, 60).validate().is_err());
        assert!(request(3, 0, 60).validate().is_err());
        assert!(request(3, 10, -5).validate().is_err());
    }

    #[test]
    fn test_rest_time_wire_names() {
        let from_short: AddAssignmentRequest = serde_json::from_value(serde_json::json!({
            "dayId": 10, "exerciseId": 5, "sets": 3, "reps": 10, "restTime": 60
        }))
        .unwrap();
        assert_eq!(from_short.rest_time_seconds, 60);

        let from_long: UpdateAssignmentRequest =
            serde_json::from_value(serde_json::json!({ "restTimeSeconds": 90 })).unwrap();
        assert_eq!(from_long.rest_time_seconds, Some(90));
        assert!(from_long.sets.is_none());
    }

    #[test]
    fn test_fractional_sets_are_rejected_by_serde() {
        let result = serde_json::from_value::<AddAssignmentRequest>(serde_json::json!({
            "dayId": 10, "exerciseId": 5, "sets": 2.5, "reps": 10, "restTime": 60
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_partial_validation() {
        let empty = UpdateAssignmentRequest::default();
        assert!(empty.is_empty());
        assert!(empty.validate().is_ok());

        let bad = UpdateAssignmentRequest {
            reps: Some(0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
