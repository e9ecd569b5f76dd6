//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Translating client messages into engine actions (resolving matching tokens)
//!   - Dispatching them into a hosted session
//!   - Turning the outcome into the reply a WebSocket client expects

use tracing::{debug, instrument};

use crate::engine::Action;
use crate::protocol::{to_snapshot, ActionOut, ClientMessage, ServerWsMessage};
use crate::state::HostedSession;

/// Translate, dispatch, snapshot. `None` when the message is not an action.
#[instrument(level = "debug", skip(hosted))]
pub fn apply_message(hosted: &mut HostedSession, msg: ClientMessage) -> Option<ActionOut> {
  let current = hosted.session.state().current_exercise_index();
  let action = msg.into_action(&hosted.view, current)?;
  let match_rejected = match &action {
    Action::MatchPair { left_id, right_id } => hosted.session.would_reject_match(left_id, right_id),
    _ => false,
  };
  debug!(target: "lesson", action = action.name(), match_rejected, "Dispatching");
  hosted.session.dispatch(&action);
  Some(ActionOut { state: to_snapshot(&hosted.session), match_rejected })
}

/// The single reply to one WebSocket message: `pong` for a ping, otherwise
/// the state with the matching cue folded in.
pub fn ws_reply(hosted: &mut HostedSession, msg: ClientMessage) -> ServerWsMessage {
  match apply_message(hosted, msg) {
    None => ServerWsMessage::Pong,
    Some(ActionOut { state, match_rejected }) => ServerWsMessage::State { state, match_rejected },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::protocol::ExerciseBodyOut;
  use crate::seeds::demo_lesson;
  use crate::session::Phase;
  use crate::state::AppState;

  fn hosted() -> HostedSession {
    AppState::new(demo_lesson().unwrap()).new_session()
  }

  fn skip_to_matching(h: &mut HostedSession) {
    apply_message(h, ClientMessage::StartLesson);
    for _ in 0..3 {
      apply_message(h, ClientMessage::Skip);
    }
  }

  #[test]
  fn ping_answers_pong() {
    let mut h = hosted();
    assert!(matches!(ws_reply(&mut h, ClientMessage::Ping), ServerWsMessage::Pong));
  }

  #[test]
  fn start_returns_state() {
    let mut h = hosted();
    let out = apply_message(&mut h, ClientMessage::StartLesson).unwrap();
    assert_eq!(out.state.session.phase, Phase::Exercise);
    assert_eq!(out.state.total_exercises, 5);
    assert!(!out.match_rejected);
  }

  #[test]
  fn matching_through_tokens() {
    let mut h = hosted();
    skip_to_matching(&mut h);
    let (left, right) = match &h.view.out().exercises[3].body {
      ExerciseBodyOut::MatchingPairs { left, right } => (left.clone(), right.clone()),
      other => panic!("expected matching pairs, got {:?}", other),
    };

    // Pick a right token that belongs to a different pair than left[0].
    let wrong = right
      .iter()
      .find(|r| h.view.resolve_right(3, &r.id) != left[0].id)
      .unwrap()
      .id
      .clone();
    let reply = ws_reply(
      &mut h,
      ClientMessage::MatchPair { left_id: left[0].id.clone(), right_id: wrong },
    );
    assert!(matches!(reply, ServerWsMessage::State { match_rejected: true, .. }));
    assert!(h.session.state().matched_pairs.is_empty());

    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["type"], "state");
    assert_eq!(json["match_rejected"], true);
    assert_eq!(json["state"]["current_index"], 3);

    for l in &left {
      let token = right.iter().find(|r| h.view.resolve_right(3, &r.id) == l.id).unwrap().id.clone();
      let out =
        apply_message(&mut h, ClientMessage::MatchPair { left_id: l.id.clone(), right_id: token }).unwrap();
      assert!(!out.match_rejected);
    }
    let out = apply_message(&mut h, ClientMessage::Submit).unwrap();
    assert_eq!(out.state.session.is_correct, Some(true));
    let feedback = out.state.feedback.unwrap();
    assert_eq!(feedback.exercise_id, "py-collections");
    assert_eq!(feedback.xp_gained, 20);
  }
}
