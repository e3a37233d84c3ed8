// API routes and handlers

pub mod exercises;
pub mod health;
pub mod routes;
pub mod workout_day_exercises;
pub mod workout_days;
pub mod workouts;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::services::{
    CompositionService, ExerciseCatalogService, PlanCache, PlanQueryService, PlanWriteSerializer,
    WorkoutPlanService,
};
use crate::store::WorkoutStore;

/// Shared handler state. Every service sees the same store, serializer and cache.
#[derive(Clone)]
pub struct AppState {
    pub catalog: ExerciseCatalogService,
    pub plans: WorkoutPlanService,
    pub composition: CompositionService,
    pub queries: PlanQueryService,
    pub jwt_service: JwtService,
    pub storage_backend: &'static str,
}

impl AppState {
    pub fn new(store: Arc<dyn WorkoutStore>, jwt_secret: &str, plan_cache_ttl: Duration) -> Self {
        let serializer = PlanWriteSerializer::new();
        let cache = PlanCache::new(plan_cache_ttl);

        Self {
            catalog: ExerciseCatalogService::new(store.clone(), cache.clone()),
            plans: WorkoutPlanService::new(store.clone(), serializer.clone(), cache.clone()),
            composition: CompositionService::new(store.clone(), serializer, cache.clone()),
            queries: PlanQueryService::new(store.clone(), cache),
            jwt_service: JwtService::new(jwt_secret),
            storage_backend: store.backend_name(),
        }
    }
}
