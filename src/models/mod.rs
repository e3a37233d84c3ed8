// Persisted records and request DTOs

pub mod exercise;
pub mod exercise_assignment;
pub mod pagination;
pub mod workout_day;
pub mod workout_plan;

pub use exercise::*;
pub use exercise_assignment::*;
pub use pagination::*;
pub use workout_day::*;
pub use workout_plan::*;

/// Trim surrounding whitespace so a blank name validates as empty
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}
