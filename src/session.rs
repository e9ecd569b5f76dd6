//! Session state of one lesson activation.
//!
//! `SessionState` is a plain value: the engine never mutates a state it was
//! handed, it returns the next one. Nothing here is persisted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Lives granted at the start of a lesson.
pub const MAX_LIVES: u32 = 3;

/// Coarse lesson phase. `Intro -> Exercise -> Completion`, never backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Intro,
    Exercise,
    Completion,
}

/// Full session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    /// Only meaningful while `phase == Exercise`.
    pub current_index: usize,
    pub lives: u32,
    pub xp_earned: u32,
    pub correct_count: u32,
    pub current_streak: u32,
    pub max_streak: u32,

    // Interaction fields; only the one matching the current variant is used.
    pub selected_option: Option<String>,
    pub filled_blanks: BTreeMap<String, String>,
    pub placed_items: Vec<String>,
    pub matched_pairs: BTreeSet<String>,

    pub has_submitted: bool,
    pub is_correct: Option<bool>,
    pub show_feedback: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Intro,
            current_index: 0,
            lives: MAX_LIVES,
            xp_earned: 0,
            correct_count: 0,
            current_streak: 0,
            max_streak: 0,
            selected_option: None,
            filled_blanks: BTreeMap::new(),
            placed_items: Vec::new(),
            matched_pairs: BTreeSet::new(),
            has_submitted: false,
            is_correct: None,
            show_feedback: false,
        }
    }
}

impl SessionState {
    /// Fresh state for a new activation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the exercise on screen, if any.
    pub fn current_exercise_index(&self) -> Option<usize> {
        (self.phase == Phase::Exercise).then_some(self.current_index)
    }

    /// Fraction of the lesson behind the learner, in `0.0..=1.0`.
    pub fn progress(&self, total: usize) -> f32 {
        match self.phase {
            Phase::Intro => 0.0,
            Phase::Completion => 1.0,
            Phase::Exercise if total == 0 => 0.0,
            Phase::Exercise => self.current_index as f32 / total as f32,
        }
    }

    /// True while an answer can still be changed.
    pub fn accepts_interaction(&self) -> bool {
        self.phase == Phase::Exercise && !self.has_submitted
    }

    /// Same accumulators, blank interaction and feedback window.
    pub(crate) fn cleared_interaction(&self) -> Self {
        Self {
            selected_option: None,
            filled_blanks: BTreeMap::new(),
            placed_items: Vec::new(),
            matched_pairs: BTreeSet::new(),
            has_submitted: false,
            is_correct: None,
            show_feedback: false,
            ..self.clone()
        }
    }
}
