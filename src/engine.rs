//! Transition engine: `(state, action) -> state` for the demo lesson.
//!
//! `transition` is pure. It reads the catalog entry at the current index,
//! asks `validate` on submit, and returns the next `SessionState`. Actions
//! that do not apply to the current phase or variant return an unchanged
//! copy; nothing here can fail.
//!
//! ```text
//! intro --start_lesson--> exercise[0] --continue/skip--> exercise[1] ... --> completion
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::domain::ExerciseKind;
use crate::session::{Phase, SessionState, MAX_LIVES};
use crate::validate;

/// Everything a learner (through the adapter) can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    StartLesson,
    SelectOption { option_id: String },
    FillBlank { blank_id: String, word: String },
    ClearBlank { blank_id: String },
    AddReorderItem { item_id: String },
    RemoveReorderItem { item_id: String },
    MatchPair { left_id: String, right_id: String },
    Submit,
    Continue,
    Skip,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartLesson => "start_lesson",
            Action::SelectOption { .. } => "select_option",
            Action::FillBlank { .. } => "fill_blank",
            Action::ClearBlank { .. } => "clear_blank",
            Action::AddReorderItem { .. } => "add_reorder_item",
            Action::RemoveReorderItem { .. } => "remove_reorder_item",
            Action::MatchPair { .. } => "match_pair",
            Action::Submit => "submit",
            Action::Continue => "continue",
            Action::Skip => "skip",
        }
    }
}

/// Compute the state that follows `state` under `action`.
pub fn transition(state: &SessionState, catalog: &Catalog, action: &Action) -> SessionState {
    match action {
        Action::StartLesson => start(state, catalog),
        Action::Submit => submit(state, catalog),
        Action::Continue if state.phase == Phase::Exercise && state.has_submitted => {
            advance(state, catalog)
        }
        Action::Continue => state.clone(),
        Action::Skip if state.phase == Phase::Exercise => {
            let next = advance(state, catalog);
            SessionState {
                current_streak: 0,
                ..next
            }
        }
        Action::Skip => state.clone(),
        interaction => interact(state, catalog, interaction),
    }
}

fn start(state: &SessionState, catalog: &Catalog) -> SessionState {
    if state.phase != Phase::Intro {
        return state.clone();
    }
    let phase = if catalog.is_empty() {
        Phase::Completion
    } else {
        Phase::Exercise
    };
    info!(target: "lesson", exercises = catalog.len(), total_xp = catalog.total_xp(), "Lesson started");
    SessionState {
        phase,
        lives: MAX_LIVES,
        ..SessionState::new()
    }
}

fn submit(state: &SessionState, catalog: &Catalog) -> SessionState {
    if !state.accepts_interaction() {
        return state.clone();
    }
    let Some(exercise) = catalog.get(state.current_index) else {
        return state.clone();
    };
    if !validate::is_ready(exercise, state) {
        debug!(target: "lesson", id = %exercise.id, "Submit ignored: answer incomplete");
        return state.clone();
    }

    let correct = validate::is_correct(exercise, state);
    let mut next = SessionState {
        has_submitted: true,
        show_feedback: true,
        is_correct: Some(correct),
        ..state.clone()
    };
    if correct {
        next.xp_earned = next.xp_earned.saturating_add(exercise.xp_reward);
        next.correct_count += 1;
        next.current_streak += 1;
    } else {
        next.lives = next.lives.saturating_sub(1);
        next.current_streak = 0;
    }
    next.max_streak = next.max_streak.max(next.current_streak);

    info!(
        target: "lesson",
        id = %exercise.id,
        variant = exercise.kind.variant().as_str(),
        correct,
        lives = next.lives,
        streak = next.current_streak,
        xp = next.xp_earned,
        "Answer submitted"
    );
    next
}

fn advance(state: &SessionState, catalog: &Catalog) -> SessionState {
    let index = state.current_index + 1;
    let mut next = state.cleared_interaction();
    if index >= catalog.len() {
        next.phase = Phase::Completion;
        next.current_index = catalog.len();
        info!(
            target: "lesson",
            correct = next.correct_count,
            total = catalog.len(),
            xp = next.xp_earned,
            lives = next.lives,
            max_streak = next.max_streak,
            "Lesson completed"
        );
    } else {
        next.current_index = index;
    }
    next
}

/// Interaction actions. Each only touches the field of its own variant.
fn interact(state: &SessionState, catalog: &Catalog, action: &Action) -> SessionState {
    if !state.accepts_interaction() {
        return state.clone();
    }
    let Some(exercise) = catalog.get(state.current_index) else {
        return state.clone();
    };

    let mut next = state.clone();
    match (&exercise.kind, action) {
        (ExerciseKind::MultipleChoice { options, .. }, Action::SelectOption { option_id }) => {
            if options.iter().any(|o| &o.id == option_id) {
                next.selected_option = Some(option_id.clone());
            }
        }
        (ExerciseKind::FillInBlank { blanks, .. }, Action::FillBlank { blank_id, word }) => {
            if blanks.iter().any(|b| &b.id == blank_id) {
                if word.is_empty() {
                    next.filled_blanks.remove(blank_id);
                } else {
                    next.filled_blanks.insert(blank_id.clone(), word.clone());
                }
            }
        }
        (ExerciseKind::FillInBlank { .. }, Action::ClearBlank { blank_id }) => {
            next.filled_blanks.remove(blank_id);
        }
        (ExerciseKind::Reorder { items, .. }, Action::AddReorderItem { item_id }) => {
            let known = items.iter().any(|i| &i.id == item_id);
            if known && !next.placed_items.contains(item_id) {
                next.placed_items.push(item_id.clone());
            }
        }
        (ExerciseKind::Reorder { .. }, Action::RemoveReorderItem { item_id }) => {
            next.placed_items.retain(|placed| placed != item_id);
        }
        (ExerciseKind::MatchingPairs { .. }, Action::MatchPair { left_id, right_id }) => {
            if validate::is_match(exercise, left_id, right_id) {
                next.matched_pairs.insert(left_id.clone());
            } else {
                debug!(target: "lesson", id = %exercise.id, %left_id, %right_id, "Match rejected");
            }
        }
        _ => {
            debug!(
                target: "lesson",
                id = %exercise.id,
                variant = exercise.kind.variant().as_str(),
                action = action.name(),
                "Interaction ignored: variant mismatch"
            );
        }
    }
    next
}

/// One lesson activation: the catalog it runs against plus the latest state.
#[derive(Debug, Clone)]
pub struct LessonSession {
    catalog: Catalog,
    state: SessionState,
}

impl LessonSession {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: SessionState::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply one action and replace the held state with the result.
    pub fn dispatch(&mut self, action: &Action) -> &SessionState {
        let next = transition(&self.state, &self.catalog, action);
        if next == self.state {
            debug!(target: "lesson", action = action.name(), "Action had no effect");
        }
        self.state = next;
        &self.state
    }

    /// Whether a match gesture would be accepted right now; used by the
    /// adapter to report a rejected attempt.
    pub fn would_reject_match(&self, left_id: &str, right_id: &str) -> bool {
        let Some(index) = self.state.current_exercise_index() else {
            return false;
        };
        if self.state.has_submitted {
            return false;
        }
        match self.catalog.get(index) {
            Some(ex) if matches!(ex.kind, ExerciseKind::MatchingPairs { .. }) => {
                !validate::is_match(ex, left_id, right_id)
            }
            _ => false,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.state.accepts_interaction()
            && self
                .state
                .current_exercise_index()
                .and_then(|i| self.catalog.get(i))
                .is_some_and(|ex| validate::is_ready(ex, &self.state))
    }
}
