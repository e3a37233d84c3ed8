use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;

use super::AppState;
use crate::auth::{AdminSession, UserSession};
use crate::models::{
    AddAssignmentRequest, ExerciseAssignment, RemoveAssignmentQuery, UpdateAssignmentRequest,
};
use crate::services::ServiceError;

pub fn workout_day_exercise_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workout-day-exercises",
            post(add_assignment).delete(remove_assignment_by_key),
        )
        .route(
            "/workout-day-exercises/:assignment_id",
            get(get_assignment)
                .patch(update_assignment)
                .delete(remove_assignment),
        )
}

/// Place a catalog exercise on a day
pub async fn add_assignment(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<AddAssignmentRequest>, ServiceError>,
) -> Result<(StatusCode, Json<ExerciseAssignment>), ServiceError> {
    let assignment = state.composition.add_assignment(request).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    _session: UserSession,
    WithRejection(Path(assignment_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<Json<ExerciseAssignment>, ServiceError> {
    Ok(Json(state.composition.get_assignment(assignment_id).await?))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(assignment_id), _): WithRejection<Path<i64>, ServiceError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateAssignmentRequest>, ServiceError>,
) -> Result<Json<ExerciseAssignment>, ServiceError> {
    Ok(Json(
        state
            .composition
            .update_assignment(assignment_id, request)
            .await?,
    ))
}

pub async fn remove_assignment(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(assignment_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<StatusCode, ServiceError> {
    state.composition.remove_assignment_by_id(assignment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deprecated: `?dayId=&exerciseId=&workoutId=`. Answers 409 when the exercise
/// occurs on the day more than once.
pub async fn remove_assignment_by_key(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Query(key), _): WithRejection<Query<RemoveAssignmentQuery>, ServiceError>,
) -> Result<StatusCode, ServiceError> {
    state.composition.remove_assignment(key).await?;
    Ok(StatusCode::NO_CONTENT)
}
