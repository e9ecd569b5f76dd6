//! Demo Lesson · "try before signup" backend
//!
//! - Axum HTTP + WebSocket API driving the lesson state machine
//! - Lesson catalog from TOML, or the built-in Python demo lesson
//! - Static SPA fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT               : u16 (default 3000)
//!   LESSON_CONFIG_PATH : path to a TOML lesson file (title, description, [[exercises]])
//!   STATIC_DIR         : SPA directory (default "./static")
//!   MAX_SESSIONS       : cap on stored HTTP sessions (default 1000)
//!   SESSION_IDLE_SECS  : idle HTTP sessions expire after this (default 1800)
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use lesson_engine_backend::config::{load_lesson_from_env, ServerConfig};
use lesson_engine_backend::routes::build_router;
use lesson_engine_backend::seeds::demo_lesson;
use lesson_engine_backend::state::{spawn_session_sweeper, AppState};
use lesson_engine_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // A configured lesson file must be valid; otherwise fall back to the demo lesson.
  let lesson = match load_lesson_from_env()? {
    Some(lesson) => lesson,
    None => {
      info!(target: "lesson_engine_backend", "LESSON_CONFIG_PATH not set; using built-in demo lesson");
      demo_lesson()?
    }
  };

  let server = ServerConfig::from_env();
  let state = Arc::new(AppState::with_limits(lesson, server.sessions));
  spawn_session_sweeper(state.clone());
  let app = build_router(state, &server.static_dir);

  let addr = SocketAddr::from(([0, 0, 0, 0], server.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "lesson_engine_backend", %addr, static_dir = %server.static_dir.display(), "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "lesson_engine_backend", error = %e, "Failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
  info!(target: "lesson_engine_backend", "Shutdown requested; active sessions are dropped");
}
