//! Router tests: drive a lesson session over the HTTP API.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lesson_engine_backend::config::SessionLimits;
use lesson_engine_backend::routes::build_router;
use lesson_engine_backend::seeds::demo_lesson;
use lesson_engine_backend::state::AppState;

fn app() -> Router {
    let state = Arc::new(AppState::new(demo_lesson().unwrap()));
    build_router(state, Path::new("./static"))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn act(app: &Router, id: &str, action: Value) -> Value {
    let (status, body) = call(app, Method::POST, &format!("/api/v1/sessions/{id}/actions"), Some(action)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn lesson_view_has_no_answers() {
    let (status, body) = call(&app(), Method::GET, "/api/v1/lesson", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercises"].as_array().unwrap().len(), 5);
    assert_eq!(body["total_xp"], 70);
    let text = body.to_string();
    assert!(!text.contains("correct_id"));
    assert!(!text.contains("correct_order"));
    assert!(!text.contains("correct_answer"));
}

#[tokio::test]
async fn session_lifecycle() {
    let app = app();
    let (status, created) = call(&app, Method::POST, "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["session_id"].as_str().unwrap().to_string();
    assert_eq!(created["state"]["phase"], "intro");
    assert_eq!(created["state"]["lives"], 3);
    assert_eq!(created["state"]["progress"], 0.0);

    let out = act(&app, &id, json!({ "type": "start_lesson" })).await;
    assert_eq!(out["state"]["phase"], "exercise");
    assert_eq!(out["state"]["can_submit"], false);

    let out = act(&app, &id, json!({ "type": "select_option", "option_id": "b" })).await;
    assert_eq!(out["state"]["selected_option"], "b");
    assert_eq!(out["state"]["can_submit"], true);

    let out = act(&app, &id, json!({ "type": "submit" })).await;
    assert_eq!(out["state"]["is_correct"], false);
    assert_eq!(out["state"]["lives"], 2);
    assert_eq!(out["state"]["feedback"]["exercise_id"], "py-print");
    assert_eq!(out["state"]["feedback"]["xp_gained"], 0);

    let out = act(&app, &id, json!({ "type": "continue" })).await;
    assert_eq!(out["state"]["current_index"], 1);
    assert_eq!(out["state"]["progress"], 0.2);
    assert!(out["state"].get("feedback").is_none());

    let (status, snapshot) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["current_index"], 1);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&id));
}

#[tokio::test]
async fn matching_rejection_is_reported() {
    let app = app();
    let (_, created) = call(&app, Method::POST, "/api/v1/sessions", None).await;
    let id = created["session_id"].as_str().unwrap().to_string();
    act(&app, &id, json!({ "type": "start_lesson" })).await;
    for _ in 0..3 {
        act(&app, &id, json!({ "type": "skip" })).await;
    }
    let out = act(
        &app,
        &id,
        json!({ "type": "match_pair", "left_id": "list", "right_id": "not-a-token" }),
    )
    .await;
    assert_eq!(out["match_rejected"], true);
    assert_eq!(out["state"]["matched_pairs"], json!([]));

    // Tokens from the lesson handed out with this session resolve to pairs.
    let matching = &created["lesson"]["exercises"][3];
    assert_eq!(matching["type"], "matching_pairs");
    let rights: Vec<String> = matching["right"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    let mut matched = 0;
    for token in &rights {
        let out = act(
            &app,
            &id,
            json!({ "type": "match_pair", "left_id": "list", "right_id": token }),
        )
        .await;
        if out["match_rejected"] == false {
            matched += 1;
        }
    }
    assert_eq!(matched, 1);
}

#[tokio::test]
async fn ping_is_not_an_http_action() {
    let app = app();
    let (_, created) = call(&app, Method::POST, "/api/v1/sessions", None).await;
    let id = created["session_id"].as_str().unwrap();
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/sessions/{id}/actions"),
        Some(json!({ "type": "ping" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let (status, _) = call(
        &app(),
        Method::POST,
        "/api/v1/sessions/missing/actions",
        Some(json!({ "type": "submit" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_store_drops_the_oldest_session() {
    let limits = SessionLimits { max_sessions: 1, idle_ttl: Duration::from_secs(3600) };
    let state = Arc::new(AppState::with_limits(demo_lesson().unwrap(), limits));
    let app = build_router(state, Path::new("./static"));

    let (_, first) = call(&app, Method::POST, "/api/v1/sessions", None).await;
    let (_, second) = call(&app, Method::POST, "/api/v1/sessions", None).await;
    let first = first["session_id"].as_str().unwrap();
    let second = second["session_id"].as_str().unwrap();

    let (status, _) = call(&app, Method::GET, &format!("/api/v1/sessions/{first}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::GET, &format!("/api/v1/sessions/{second}"), None).await;
    assert_eq!(status, StatusCode::OK);
}
