use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;

use super::AppState;
use crate::auth::{AdminSession, UserSession};
use crate::models::{WorkoutDay, WorkoutDayDetail, WorkoutDayRequest};
use crate::services::ServiceError;

// POST takes a plan id, the other methods a day id
pub fn workout_day_routes() -> Router<AppState> {
    Router::new().route(
        "/workout-days/:id",
        get(get_workout_day)
            .post(create_workout_day)
            .patch(rename_workout_day)
            .delete(delete_workout_day),
    )
}

pub async fn create_workout_day(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(plan_id), _): WithRejection<Path<i64>, ServiceError>,
    WithRejection(Json(request), _): WithRejection<Json<WorkoutDayRequest>, ServiceError>,
) -> Result<(StatusCode, Json<WorkoutDay>), ServiceError> {
    let day = state.composition.create_day(plan_id, request).await?;
    Ok((StatusCode::CREATED, Json(day)))
}

pub async fn get_workout_day(
    State(state): State<AppState>,
    _session: UserSession,
    WithRejection(Path(day_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<Json<WorkoutDayDetail>, ServiceError> {
    Ok(Json(state.composition.get_day(day_id).await?))
}

pub async fn rename_workout_day(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(day_id), _): WithRejection<Path<i64>, ServiceError>,
    WithRejection(Json(request), _): WithRejection<Json<WorkoutDayRequest>, ServiceError>,
) -> Result<Json<WorkoutDay>, ServiceError> {
    Ok(Json(state.composition.rename_day(day_id, request).await?))
}

/// Delete a day together with its exercise assignments
pub async fn delete_workout_day(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(day_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<StatusCode, ServiceError> {
    state.composition.delete_day(day_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
