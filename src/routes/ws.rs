//! WebSocket upgrade + message loop. One lesson session per connection: the
//! lesson view goes out on connect, then every client message is parsed as
//! JSON, dispatched, and answered with the resulting state.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::ws_reply;
use crate::protocol::{ClientMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "lesson_engine_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "lesson_engine_backend", "WebSocket connected");
  let mut hosted = state.new_session();

  let hello = ServerWsMessage::Lesson { lesson: hosted.view.out().clone() };
  if let Err(e) = send(&mut socket, &hello).await {
    error!(target: "lesson_engine_backend", error = %e, "WS send error");
    return;
  }

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = match serde_json::from_str::<ClientMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "lesson_engine_backend", "WS received: {:?}", &incoming);
            ws_reply(&mut hosted, incoming)
          }
          Err(e) => {
            debug!(target: "lesson_engine_backend", payload = %trunc_for_log(&txt, 200), "WS invalid message");
            ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }
          }
        };

        if let Err(e) = send(&mut socket, &reply).await {
          error!(target: "lesson_engine_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }

  let s = hosted.session.state();
  info!(target: "lesson", phase = ?s.phase, xp = s.xp_earned, correct = s.correct_count, "WebSocket lesson session discarded");
  info!(target: "lesson_engine_backend", "WebSocket disconnected");
}
