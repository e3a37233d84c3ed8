use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::exercises::exercise_routes;
use super::health::health_check;
use super::workout_day_exercises::workout_day_exercise_routes;
use super::workout_days::workout_day_routes;
use super::workouts::workout_routes;
use super::AppState;
use crate::auth::jwt_auth_middleware;
use crate::auth::middleware::{cors_layer, security_headers_layer};

pub fn create_routes(state: AppState) -> Router {
    // Everything but the health check needs a bearer token
    let protected = Router::new()
        .merge(exercise_routes())
        .merge(workout_routes())
        .merge(workout_day_routes())
        .merge(workout_day_exercise_routes())
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security_headers_layer())
                .layer(cors_layer()),
        )
        .with_state(state)
}
