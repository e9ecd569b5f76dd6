//! Domain models for the demo lesson: exercises and their four variants.
//!
//! Exercises are plain data. Answer keys (`correct_id`, `correct_answer`,
//! `correct_order`, pair identity) live here and must never be serialized
//! towards a client; see `protocol::LessonView` for the public projection.

use serde::{Deserialize, Serialize};

/// One exercise of the lesson catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
  pub id: String,
  /// Short concept introduction shown above the prompt.
  #[serde(default)]
  pub concept: String,
  pub prompt: String,
  /// Shown once the learner has submitted.
  #[serde(default)]
  pub explanation: String,
  #[serde(default)]
  pub xp_reward: u32,
  #[serde(flatten)]
  pub kind: ExerciseKind,
}

/// Variant-specific payload, discriminated by `type`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseKind {
  MultipleChoice {
    options: Vec<Choice>,
    correct_id: String,
  },
  FillInBlank {
    /// Source lines; blanks are written as `{{blank_id}}`.
    code_lines: Vec<String>,
    blanks: Vec<Blank>,
    #[serde(default)]
    distractors: Vec<String>,
  },
  Reorder {
    items: Vec<ReorderItem>,
    correct_order: Vec<String>,
  },
  MatchingPairs {
    pairs: Vec<Pair>,
  },
}

impl ExerciseKind {
  pub fn variant(&self) -> Variant {
    match self {
      ExerciseKind::MultipleChoice { .. } => Variant::MultipleChoice,
      ExerciseKind::FillInBlank { .. } => Variant::FillInBlank,
      ExerciseKind::Reorder { .. } => Variant::Reorder,
      ExerciseKind::MatchingPairs { .. } => Variant::MatchingPairs,
    }
  }
}

/// Payload-free discriminant, used for logging and the public view.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
  MultipleChoice,
  FillInBlank,
  Reorder,
  MatchingPairs,
}

impl Variant {
  pub fn as_str(&self) -> &'static str {
    match self {
      Variant::MultipleChoice => "multiple_choice",
      Variant::FillInBlank => "fill_in_blank",
      Variant::Reorder => "reorder",
      Variant::MatchingPairs => "matching_pairs",
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
  pub id: String,
  pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Blank {
  pub id: String,
  pub correct_answer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderItem {
  pub id: String,
  pub text: String,
}

/// A concept/definition pair. Left and right share the pair `id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pair {
  pub id: String,
  pub left: String,
  pub right: String,
}
