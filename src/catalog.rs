//! Exercise catalog: the ordered, immutable list of exercises for one lesson.
//!
//! A `Catalog` can only be built through [`Catalog::new`], which checks every
//! exercise once. The engine relies on that and never re-validates the
//! catalog while handling actions.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{Exercise, ExerciseKind};
use crate::util::blank_ids;

/// Load-time catalog problems. Each names the offending exercise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("exercise #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate exercise id '{id}'")]
    DuplicateExercise { id: String },

    #[error("exercise '{id}': {message}")]
    Invalid { id: String, message: String },
}

impl CatalogError {
    fn invalid(id: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Validated, shareable exercise list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    exercises: Arc<[Exercise]>,
}

impl Catalog {
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut total_xp: u32 = 0;
        for (index, ex) in exercises.iter().enumerate() {
            if ex.id.trim().is_empty() {
                return Err(CatalogError::EmptyId { index });
            }
            if !seen.insert(ex.id.as_str()) {
                return Err(CatalogError::DuplicateExercise { id: ex.id.clone() });
            }
            check_exercise(ex)?;
            total_xp = total_xp.checked_add(ex.xp_reward).ok_or_else(|| {
                CatalogError::invalid(&ex.id, "xp_reward pushes the lesson total past u32")
            })?;
        }
        Ok(Self {
            exercises: exercises.into(),
        })
    }

    pub fn get(&self, index: usize) -> Option<&Exercise> {
        self.exercises.get(index)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter()
    }

    /// XP available for a perfect run. Fits in `u32`; `new` rejects larger totals.
    pub fn total_xp(&self) -> u32 {
        self.exercises.iter().map(|e| e.xp_reward).sum()
    }
}

fn unique<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<HashSet<&'a str>, &'a str> {
    let mut set = HashSet::new();
    for id in ids {
        if id.is_empty() || !set.insert(id) {
            return Err(id);
        }
    }
    Ok(set)
}

fn check_exercise(ex: &Exercise) -> Result<(), CatalogError> {
    let id = ex.id.as_str();
    match &ex.kind {
        ExerciseKind::MultipleChoice {
            options,
            correct_id,
        } => {
            if options.len() < 2 {
                return Err(CatalogError::invalid(id, "needs at least two options"));
            }
            let ids = unique(options.iter().map(|o| o.id.as_str()))
                .map_err(|dup| CatalogError::invalid(id, format!("bad option id '{dup}'")))?;
            if !ids.contains(correct_id.as_str()) {
                return Err(CatalogError::invalid(
                    id,
                    format!("correct_id '{correct_id}' is not an option"),
                ));
            }
        }
        ExerciseKind::FillInBlank {
            code_lines,
            blanks,
            distractors,
        } => {
            if blanks.is_empty() {
                return Err(CatalogError::invalid(id, "needs at least one blank"));
            }
            let ids = unique(blanks.iter().map(|b| b.id.as_str()))
                .map_err(|dup| CatalogError::invalid(id, format!("bad blank id '{dup}'")))?;
            if let Some(b) = blanks.iter().find(|b| b.correct_answer.is_empty()) {
                return Err(CatalogError::invalid(
                    id,
                    format!("blank '{}' has an empty answer", b.id),
                ));
            }
            let markers: HashSet<&str> = code_lines.iter().flat_map(|l| blank_ids(l)).collect();
            if let Some(missing) = ids.iter().find(|b| !markers.contains(*b)) {
                return Err(CatalogError::invalid(
                    id,
                    format!("blank '{missing}' has no marker in code_lines"),
                ));
            }
            if let Some(stray) = markers.iter().find(|m| !ids.contains(*m)) {
                return Err(CatalogError::invalid(
                    id,
                    format!("marker '{stray}' does not name a blank"),
                ));
            }
            if let Some(d) = distractors
                .iter()
                .find(|d| blanks.iter().any(|b| &b.correct_answer == *d))
            {
                return Err(CatalogError::invalid(
                    id,
                    format!("distractor '{d}' is also a blank answer"),
                ));
            }
        }
        ExerciseKind::Reorder {
            items,
            correct_order,
        } => {
            if items.len() < 2 {
                return Err(CatalogError::invalid(id, "needs at least two items"));
            }
            let ids = unique(items.iter().map(|i| i.id.as_str()))
                .map_err(|dup| CatalogError::invalid(id, format!("bad item id '{dup}'")))?;
            let order = unique(correct_order.iter().map(String::as_str)).map_err(|dup| {
                CatalogError::invalid(id, format!("correct_order repeats '{dup}'"))
            })?;
            if order != ids {
                return Err(CatalogError::invalid(
                    id,
                    "correct_order must be a permutation of the item ids",
                ));
            }
        }
        ExerciseKind::MatchingPairs { pairs } => {
            if pairs.len() < 2 {
                return Err(CatalogError::invalid(id, "needs at least two pairs"));
            }
            unique(pairs.iter().map(|p| p.id.as_str()))
                .map_err(|dup| CatalogError::invalid(id, format!("bad pair id '{dup}'")))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Blank, Choice, Pair, ReorderItem};

    fn ex(id: &str, kind: ExerciseKind) -> Exercise {
        Exercise {
            id: id.into(),
            concept: String::new(),
            prompt: "p".into(),
            explanation: String::new(),
            xp_reward: 5,
            kind,
        }
    }

    fn mc(correct: &str) -> ExerciseKind {
        ExerciseKind::MultipleChoice {
            options: vec![
                Choice { id: "a".into(), text: "A".into() },
                Choice { id: "b".into(), text: "B".into() },
            ],
            correct_id: correct.into(),
        }
    }

    #[test]
    fn accepts_well_formed_catalog() {
        let catalog = Catalog::new(vec![ex("one", mc("a")), ex("two", mc("b"))]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.total_xp(), 10);
        assert_eq!(catalog.get(1).map(|e| e.id.as_str()), Some("two"));
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn rejects_duplicate_and_empty_ids() {
        assert_eq!(
            Catalog::new(vec![ex("one", mc("a")), ex("one", mc("a"))]),
            Err(CatalogError::DuplicateExercise { id: "one".into() })
        );
        assert_eq!(
            Catalog::new(vec![ex(" ", mc("a"))]),
            Err(CatalogError::EmptyId { index: 0 })
        );
    }

    #[test]
    fn rejects_unknown_correct_option() {
        let err = Catalog::new(vec![ex("one", mc("z"))]).unwrap_err();
        assert!(err.to_string().contains("correct_id 'z'"));
    }

    #[test]
    fn fill_in_blank_markers_must_match_blanks() {
        let kind = |lines: &[&str], distractors: &[&str]| ExerciseKind::FillInBlank {
            code_lines: lines.iter().map(|s| s.to_string()).collect(),
            blanks: vec![Blank { id: "b1".into(), correct_answer: "def".into() }],
            distractors: distractors.iter().map(|s| s.to_string()).collect(),
        };
        assert!(Catalog::new(vec![ex("f", kind(&["{{b1}} greet():"], &["fn"]))]).is_ok());
        assert!(Catalog::new(vec![ex("f", kind(&["greet():"], &[]))]).is_err());
        assert!(Catalog::new(vec![ex("f", kind(&["{{b1}} {{b2}}"], &[]))]).is_err());
        assert!(Catalog::new(vec![ex("f", kind(&["{{b1}}"], &["def"]))]).is_err());
    }

    #[test]
    fn reorder_needs_a_permutation() {
        let items = || {
            vec![
                ReorderItem { id: "x".into(), text: "X".into() },
                ReorderItem { id: "y".into(), text: "Y".into() },
            ]
        };
        let ok = ExerciseKind::Reorder { items: items(), correct_order: vec!["y".into(), "x".into()] };
        let short = ExerciseKind::Reorder { items: items(), correct_order: vec!["x".into()] };
        let repeat = ExerciseKind::Reorder {
            items: items(),
            correct_order: vec!["x".into(), "x".into()],
        };
        assert!(Catalog::new(vec![ex("r", ok)]).is_ok());
        assert!(Catalog::new(vec![ex("r", short)]).is_err());
        assert!(Catalog::new(vec![ex("r", repeat)]).is_err());
    }

    #[test]
    fn rejects_xp_total_that_overflows() {
        let rich = |id: &str| Exercise { xp_reward: 3_000_000_000, ..ex(id, mc("a")) };
        let err = Catalog::new(vec![rich("one"), rich("two")]).unwrap_err();
        assert!(matches!(&err, CatalogError::Invalid { id, .. } if id == "two"));

        let max = Exercise { xp_reward: u32::MAX, ..ex("max", mc("a")) };
        let zero = Exercise { xp_reward: 0, ..ex("zero", mc("b")) };
        assert_eq!(Catalog::new(vec![max, zero]).unwrap().total_xp(), u32::MAX);
    }

    #[test]
    fn matching_needs_two_distinct_pairs() {
        let pair = |id: &str| Pair { id: id.into(), left: "l".into(), right: "r".into() };
        let one = ExerciseKind::MatchingPairs { pairs: vec![pair("p1")] };
        let dup = ExerciseKind::MatchingPairs { pairs: vec![pair("p1"), pair("p1")] };
        assert!(Catalog::new(vec![ex("m", one)]).is_err());
        assert!(Catalog::new(vec![ex("m", dup)]).is_err());
    }
}
