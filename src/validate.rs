//! Per-variant answer checks.
//!
//! Both predicates are total: any exercise paired with any session state
//! yields a boolean. Interaction fields of other variants are ignored.

use crate::domain::{Exercise, ExerciseKind};
use crate::session::SessionState;

/// Whether the learner has given a complete answer for `exercise`.
pub fn is_ready(exercise: &Exercise, state: &SessionState) -> bool {
    match &exercise.kind {
        ExerciseKind::MultipleChoice { .. } => state.selected_option.is_some(),
        ExerciseKind::FillInBlank { blanks, .. } => blanks.iter().all(|b| {
            state
                .filled_blanks
                .get(&b.id)
                .is_some_and(|w| !w.is_empty())
        }),
        ExerciseKind::Reorder { items, .. } => state.placed_items.len() == items.len(),
        ExerciseKind::MatchingPairs { pairs } => {
            pairs.iter().all(|p| state.matched_pairs.contains(&p.id))
        }
    }
}

/// Whether the current answer is right. No partial credit.
pub fn is_correct(exercise: &Exercise, state: &SessionState) -> bool {
    match &exercise.kind {
        ExerciseKind::MultipleChoice { correct_id, .. } => {
            state.selected_option.as_deref() == Some(correct_id.as_str())
        }
        ExerciseKind::FillInBlank { blanks, .. } => blanks
            .iter()
            .all(|b| state.filled_blanks.get(&b.id) == Some(&b.correct_answer)),
        ExerciseKind::Reorder { correct_order, .. } => state.placed_items == *correct_order,
        // Pairs are checked as they are matched; completeness is all that's left.
        ExerciseKind::MatchingPairs { pairs } => {
            pairs
                .iter()
                .filter(|p| state.matched_pairs.contains(&p.id))
                .count()
                == pairs.len()
        }
    }
}

/// Incremental check for one matching gesture: both sides must name the same
/// pair of this exercise.
pub fn is_match(exercise: &Exercise, left_id: &str, right_id: &str) -> bool {
    match &exercise.kind {
        ExerciseKind::MatchingPairs { pairs } => {
            left_id == right_id && pairs.iter().any(|p| p.id == left_id)
        }
        _ => false,
    }
}
