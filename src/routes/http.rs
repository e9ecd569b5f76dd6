//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
  status: StatusCode,
  message: String,
}

impl ApiError {
  fn unknown_session(id: &str) -> Self {
    Self { status: StatusCode::NOT_FOUND, message: format!("Unknown session: {}", id) }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status, Json(ErrorOut { error: self.message })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_lesson(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let view = state.lesson_view();
  Json(view.out().clone())
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let out = state.create_session().await;
  (StatusCode::CREATED, Json(out))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SnapshotOut>, ApiError> {
  state.snapshot(&id).await.map(Json).ok_or_else(|| ApiError::unknown_session(&id))
}

#[instrument(level = "info", skip(state, msg), fields(%id, msg = ?msg))]
pub async fn http_post_action(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(msg): Json<ClientMessage>,
) -> Result<Json<ActionOut>, ApiError> {
  match state.dispatch(&id, msg).await {
    None => Err(ApiError::unknown_session(&id)),
    Some(None) => Err(ApiError { status: StatusCode::BAD_REQUEST, message: "Message is not a lesson action".into() }),
    Some(Some(out)) => {
      info!(target: "lesson", session_id = %id, phase = ?out.state.session.phase, index = out.state.session.current_index, "HTTP action applied");
      Ok(Json(out))
    }
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  if state.end_session(&id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::unknown_session(&id))
  }
}
