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
use crate::models::{
    CreateWorkoutPlanRequest, UpdateWorkoutPlanRequest, WorkoutPlan, WorkoutPlanDetail,
    WorkoutPlanFilter,
};
use crate::services::ServiceError;

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", get(list_workouts).post(create_workout))
        .route(
            "/workouts/:workout_id",
            get(get_workout).patch(update_workout).delete(delete_workout),
        )
}

/// List plans without their days
pub async fn list_workouts(
    State(state): State<AppState>,
    _session: UserSession,
    WithRejection(Query(filter), _): WithRejection<Query<WorkoutPlanFilter>, ServiceError>,
) -> Result<Json<Vec<WorkoutPlan>>, ServiceError> {
    Ok(Json(state.plans.list_plans(filter).await?))
}

/// Get a plan with `days[].exercises[]` populated
pub async fn get_workout(
    State(state): State<AppState>,
    _session: UserSession,
    WithRejection(Path(workout_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<Json<WorkoutPlanDetail>, ServiceError> {
    Ok(Json(state.queries.get_plan_detail(workout_id).await?))
}

pub async fn create_workout(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<CreateWorkoutPlanRequest>, ServiceError>,
) -> Result<(StatusCode, Json<WorkoutPlan>), ServiceError> {
    let plan = state.plans.create_plan(request, Some(admin.user_id)).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_workout(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(workout_id), _): WithRejection<Path<i64>, ServiceError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateWorkoutPlanRequest>, ServiceError>,
) -> Result<Json<WorkoutPlan>, ServiceError> {
    Ok(Json(state.plans.update_plan(workout_id, request).await?))
}

/// Delete a plan along with its days and their assignments
pub async fn delete_workout(
    State(state): State<AppState>,
    _admin: AdminSession,
    WithRejection(Path(workout_id), _): WithRejection<Path<i64>, ServiceError>,
) -> Result<StatusCode, ServiceError> {
    state.plans.delete_plan(workout_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
