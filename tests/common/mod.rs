// Shared helpers for the integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use workout_planner::auth::{Claims, UserRole};
use workout_planner::models::{CreateExerciseRequest, CreateWorkoutPlanRequest, DifficultyLevel};
use workout_planner::store::InMemoryWorkoutStore;
use workout_planner::{create_routes, AppState};

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";

/// Services over a fresh in-memory store with caching on
pub fn memory_state() -> AppState {
    AppState::new(
        Arc::new(InMemoryWorkoutStore::new()),
        TEST_JWT_SECRET,
        Duration::from_secs(60),
    )
}

pub fn test_app() -> Router {
    create_routes(memory_state())
}

pub fn token_for(user_id: Uuid, role: UserRole) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (now + ChronoDuration::hours(1)).timestamp() as usize,
        iat: Some(now.timestamp() as usize),
        email: Some(format!("{}@example.com", role.as_str())),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn token(role: UserRole) -> String {
    token_for(Uuid::new_v4(), role)
}

/// Send one request through the router and decode the JSON body, if any
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    role: Option<UserRole>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("Authorization", format!("Bearer {}", token(role)));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub fn exercise_request(name: &str) -> CreateExerciseRequest {
    CreateExerciseRequest {
        name: name.to_string(),
        description: None,
        muscle_group: Some("legs".to_string()),
        equipment: Some("barbell".to_string()),
        image_url: None,
    }
}

pub fn plan_request(name: &str) -> CreateWorkoutPlanRequest {
    CreateWorkoutPlanRequest {
        name: name.to_string(),
        description: Some("Three day split".to_string()),
        difficulty_level: DifficultyLevel::Intermediate,
        goal: "Strength".to_string(),
        duration_days: 28,
        active: None,
        image_url: None,
    }
}
