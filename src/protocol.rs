//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Nothing in here carries an answer key. Exercises go out through
//! `LessonView`, which shuffles the word bank, the reorder items and the
//! matching right column, and hides pair identity behind opaque tokens.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::{Choice, ExerciseKind, ReorderItem};
use crate::engine::{Action, LessonSession};
use crate::session::SessionState;

/// Messages the client can send, over WebSocket or as an HTTP action body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    StartLesson,
    SelectOption {
        option_id: String,
    },
    FillBlank {
        blank_id: String,
        word: String,
    },
    ClearBlank {
        blank_id: String,
    },
    AddReorderItem {
        item_id: String,
    },
    RemoveReorderItem {
        item_id: String,
    },
    /// `right_id` is the token the lesson view handed out, not a pair id.
    MatchPair {
        left_id: String,
        right_id: String,
    },
    Submit,
    Continue,
    Skip,
}

impl ClientMessage {
    /// Engine action for this message; `None` for `ping`. Matching tokens are
    /// resolved against the exercise at `current` only.
    pub fn into_action(self, view: &LessonView, current: Option<usize>) -> Option<Action> {
        let action = match self {
            ClientMessage::Ping => return None,
            ClientMessage::StartLesson => Action::StartLesson,
            ClientMessage::SelectOption { option_id } => Action::SelectOption { option_id },
            ClientMessage::FillBlank { blank_id, word } => Action::FillBlank { blank_id, word },
            ClientMessage::ClearBlank { blank_id } => Action::ClearBlank { blank_id },
            ClientMessage::AddReorderItem { item_id } => Action::AddReorderItem { item_id },
            ClientMessage::RemoveReorderItem { item_id } => Action::RemoveReorderItem { item_id },
            ClientMessage::MatchPair { left_id, right_id } => Action::MatchPair {
                left_id,
                right_id: match current {
                    Some(index) => view.resolve_right(index, &right_id),
                    None => right_id,
                },
            },
            ClientMessage::Submit => Action::Submit,
            ClientMessage::Continue => Action::Continue,
            ClientMessage::Skip => Action::Skip,
        };
        Some(action)
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Lesson {
        lesson: LessonOut,
    },
    /// `match_rejected` is the transient cue for a wrong matching attempt;
    /// the state did not change.
    State {
        state: SnapshotOut,
        match_rejected: bool,
    },
    Error {
        message: String,
    },
}

/// Answer-free lesson as shown to the learner.
#[derive(Debug, Clone, Serialize)]
pub struct LessonOut {
    pub title: String,
    pub description: String,
    pub total_xp: u32,
    pub exercises: Vec<ExerciseOut>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseOut {
    pub id: String,
    pub concept: String,
    pub prompt: String,
    pub xp_reward: u32,
    #[serde(flatten)]
    pub body: ExerciseBodyOut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseBodyOut {
    MultipleChoice {
        options: Vec<Choice>,
    },
    FillInBlank {
        code_lines: Vec<String>,
        blank_ids: Vec<String>,
        /// Blank answers mixed with distractors.
        word_bank: Vec<String>,
    },
    Reorder {
        items: Vec<ReorderItem>,
    },
    MatchingPairs {
        left: Vec<MatchSide>,
        right: Vec<MatchSide>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSide {
    pub id: String,
    pub text: String,
}

/// Per-activation projection of a catalog. Keeps the token tables for the
/// matching right columns server-side, one per catalog position.
#[derive(Debug, Clone)]
pub struct LessonView {
    out: LessonOut,
    right_tokens: Vec<HashMap<String, String>>,
}

impl LessonView {
    pub fn build(title: &str, description: &str, catalog: &Catalog) -> Self {
        Self::build_with_rng(title, description, catalog, &mut rand::thread_rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(
        title: &str,
        description: &str,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Self {
        let mut right_tokens = Vec::with_capacity(catalog.len());
        let exercises = catalog
            .iter()
            .map(|ex| {
                let mut tokens = HashMap::new();
                let body = match &ex.kind {
                    ExerciseKind::MultipleChoice { options, .. } => ExerciseBodyOut::MultipleChoice {
                        options: options.clone(),
                    },
                    ExerciseKind::FillInBlank {
                        code_lines,
                        blanks,
                        distractors,
                    } => {
                        let mut word_bank: Vec<String> = blanks
                            .iter()
                            .map(|b| b.correct_answer.clone())
                            .chain(distractors.iter().cloned())
                            .collect();
                        word_bank.shuffle(rng);
                        ExerciseBodyOut::FillInBlank {
                            code_lines: code_lines.clone(),
                            blank_ids: blanks.iter().map(|b| b.id.clone()).collect(),
                            word_bank,
                        }
                    }
                    ExerciseKind::Reorder { items, .. } => {
                        let mut items = items.clone();
                        items.shuffle(rng);
                        ExerciseBodyOut::Reorder { items }
                    }
                    ExerciseKind::MatchingPairs { pairs } => {
                        let left = pairs
                            .iter()
                            .map(|p| MatchSide {
                                id: p.id.clone(),
                                text: p.left.clone(),
                            })
                            .collect();
                        let mut right: Vec<MatchSide> = pairs
                            .iter()
                            .map(|p| {
                                let token = Uuid::new_v4().simple().to_string();
                                tokens.insert(token.clone(), p.id.clone());
                                MatchSide {
                                    id: token,
                                    text: p.right.clone(),
                                }
                            })
                            .collect();
                        right.shuffle(rng);
                        ExerciseBodyOut::MatchingPairs { left, right }
                    }
                };
                right_tokens.push(tokens);
                ExerciseOut {
                    id: ex.id.clone(),
                    concept: ex.concept.clone(),
                    prompt: ex.prompt.clone(),
                    xp_reward: ex.xp_reward,
                    body,
                }
            })
            .collect();

        Self {
            out: LessonOut {
                title: title.to_string(),
                description: description.to_string(),
                total_xp: catalog.total_xp(),
                exercises,
            },
            right_tokens,
        }
    }

    pub fn out(&self) -> &LessonOut {
        &self.out
    }

    /// Pair id behind a right-column token of exercise `index`. Unknown
    /// tokens, including those of other exercises, pass through unchanged so
    /// they can never match a pair.
    pub fn resolve_right(&self, index: usize, token: &str) -> String {
        self.right_tokens
            .get(index)
            .and_then(|tokens| tokens.get(token))
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }
}

/// What the adapter renders after every transition.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotOut {
    #[serde(flatten)]
    pub session: SessionState,
    pub total_exercises: usize,
    pub progress: f32,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackOut>,
}

/// Post-submission details; only present once the answer is locked in.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackOut {
    pub exercise_id: String,
    pub correct: bool,
    pub explanation: String,
    pub xp_gained: u32,
}

pub fn to_snapshot(session: &LessonSession) -> SnapshotOut {
    let state = session.state();
    let catalog = session.catalog();
    let feedback = state
        .current_exercise_index()
        .filter(|_| state.show_feedback)
        .and_then(|i| catalog.get(i))
        .map(|ex| {
            let correct = state.is_correct.unwrap_or(false);
            FeedbackOut {
                exercise_id: ex.id.clone(),
                correct,
                explanation: ex.explanation.clone(),
                xp_gained: if correct { ex.xp_reward } else { 0 },
            }
        });
    SnapshotOut {
        session: state.clone(),
        total_exercises: catalog.len(),
        progress: state.progress(catalog.len()),
        can_submit: session.can_submit(),
        feedback,
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Serialize)]
pub struct SessionCreatedOut {
    pub session_id: String,
    pub lesson: LessonOut,
    pub state: SnapshotOut,
}

#[derive(Debug, Serialize)]
pub struct ActionOut {
    pub state: SnapshotOut,
    pub match_rejected: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
