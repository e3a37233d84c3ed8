use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;

use super::AppState;
use crate::auth::{AdminSession, UserSession};
use crate::models::{CreateExerciseRequest, Exercise, ExerciseFilter, UpdateExerciseRequest};
use crate::services::ServiceError;

pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/exercises/:exercise_id",
            get(get_exercise).patch(update_exercise).delete(delete_exercise),
        )
}

/// List catalog exercises, optionally filtered by name and muscle group
pub async fn list_exercises(
    State(state): State<AppState>,
    _session: UserSession,
    WithRejection(Query(filter), _): WithRejection<Query<ExerciseFilter>, ServiceError>,
) -> Result<Json<Vec<Exercise>>, ServiceError> {
    Ok(Json(state.catalog.list_exercises(filter).await?))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    _session: UserSession,
    WithRejection(Path(exercise_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<Json<Exercise>, ServiceError> {
    Ok(Json(state.catalog.get_exercise(exercise_id).await?))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateExerciseRequest>, ServiceError>,
) -> Result<(StatusCode, Json<Exercise>), ServiceError> {
    let exercise = state.catalog.create_exercise(request).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(exercise_id), _): WithRejection<Path<i64>, ServiceError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateExerciseRequest>, ServiceError>,
) -> Result<Json<Exercise>, ServiceError> {
    Ok(Json(state.catalog.update_exercise(exercise_id, request).await?))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(exercise_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<StatusCode, ServiceError> {
    state.catalog.delete_exercise(exercise_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
