// Business logic services

pub mod composition_service;
pub mod errors;
pub mod exercise_catalog_service;
pub mod plan_cache;
pub mod plan_query_service;
pub mod plan_serializer;
pub mod workout_plan_service;

pub use composition_service::CompositionService;
pub use errors::ServiceError;
pub use exercise_catalog_service::ExerciseCatalogService;
pub use plan_cache::PlanCache;
pub use plan_query_service::PlanQueryService;
pub use plan_serializer::{PlanWriteGuard, PlanWriteSerializer};
pub use workout_plan_service::WorkoutPlanService;
