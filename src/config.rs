//! Loading the lesson (title, description, exercise catalog) from TOML, plus
//! the few server settings read from the environment.
//!
//! Expected lesson file:
//!
//! ```toml
//! title = "Python in five minutes"
//! description = "..."
//!
//! [[exercises]]
//! id = "py-print"
//! type = "multiple_choice"
//! prompt = "What does print(\"hi\") do?"
//! xp_reward = 10
//! correct_id = "a"
//! options = [{ id = "a", text = "Shows hi" }, { id = "b", text = "Saves a file" }]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::catalog::{Catalog, CatalogError};
use crate::domain::Exercise;

/// Raw lesson file as written in TOML.
#[derive(Clone, Debug, Deserialize)]
pub struct LessonFile {
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub exercises: Vec<Exercise>,
}

fn default_title() -> String {
  "Demo lesson".into()
}

/// A lesson whose catalog passed validation.
#[derive(Clone, Debug)]
pub struct Lesson {
  pub title: String,
  pub description: String,
  pub catalog: Catalog,
}

impl TryFrom<LessonFile> for Lesson {
  type Error = CatalogError;

  fn try_from(file: LessonFile) -> Result<Self, Self::Error> {
    Ok(Self {
      title: file.title,
      description: file.description,
      catalog: Catalog::new(file.exercises)?,
    })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("failed to read lesson file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse lesson file '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("invalid lesson in '{path}': {source}")]
  Catalog {
    path: PathBuf,
    #[source]
    source: CatalogError,
  },
}

/// Parse and validate a lesson from TOML text. `path` only labels errors.
pub fn parse_lesson(path: &Path, text: &str) -> Result<Lesson, ConfigError> {
  let file: LessonFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  Lesson::try_from(file).map_err(|source| ConfigError::Catalog {
    path: path.to_path_buf(),
    source,
  })
}

pub fn load_lesson(path: &Path) -> Result<Lesson, ConfigError> {
  let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  parse_lesson(path, &text)
}

/// Load the lesson named by LESSON_CONFIG_PATH. `Ok(None)` when the variable
/// is unset; any problem with a configured file is an error so startup fails.
pub fn load_lesson_from_env() -> Result<Option<Lesson>, ConfigError> {
  let Ok(path) = std::env::var("LESSON_CONFIG_PATH") else {
    return Ok(None);
  };
  let path = PathBuf::from(path);
  match load_lesson(&path) {
    Ok(lesson) => {
      info!(target: "lesson_engine_backend", path = %path.display(), exercises = lesson.catalog.len(), "Loaded lesson file (TOML)");
      Ok(Some(lesson))
    }
    Err(e) => {
      error!(target: "lesson_engine_backend", path = %path.display(), error = %e, "Failed to load lesson file");
      Err(e)
    }
  }
}

/// Bounds on the HTTP session store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
  /// Most sessions held at once; creating one more evicts the stalest.
  pub max_sessions: usize,
  /// Sessions untouched for this long are dropped.
  pub idle_ttl: Duration,
}

impl Default for SessionLimits {
  fn default() -> Self {
    Self { max_sessions: 1000, idle_ttl: Duration::from_secs(30 * 60) }
  }
}

impl SessionLimits {
  pub fn from_env() -> Self {
    let defaults = Self::default();
    let max_sessions = env_number::<usize>("MAX_SESSIONS")
      .filter(|n| *n > 0)
      .unwrap_or(defaults.max_sessions);
    let idle_ttl = env_number::<u64>("SESSION_IDLE_SECS")
      .filter(|n| *n > 0)
      .map(Duration::from_secs)
      .unwrap_or(defaults.idle_ttl);
    Self { max_sessions, idle_ttl }
  }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
  std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Listener, static-file and session-store settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
  pub port: u16,
  pub static_dir: PathBuf,
  pub sessions: SessionLimits,
}

impl ServerConfig {
  pub fn from_env() -> Self {
    let port = env_number::<u16>("PORT").unwrap_or(3000);
    let static_dir = std::env::var("STATIC_DIR")
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from("./static"));
    Self { port, static_dir, sessions: SessionLimits::from_env() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ExerciseKind;

  const LESSON: &str = r#"
title = "Rust basics"

[[exercises]]
id = "mut"
type = "multiple_choice"
concept = "Bindings are immutable unless marked."
prompt = "Which keyword makes a binding mutable?"
explanation = "let mut allows reassignment."
xp_reward = 10
correct_id = "m"
options = [{ id = "m", text = "mut" }, { id = "v", text = "var" }]

[[exercises]]
id = "order"
type = "reorder"
prompt = "Order the steps"
xp_reward = 5
correct_order = ["a", "b"]
items = [{ id = "b", text = "second" }, { id = "a", text = "first" }]

[[exercises]]
id = "pairs"
type = "matching_pairs"
prompt = "Match"
pairs = [
  { id = "vec", left = "Vec", right = "growable array" },
  { id = "box", left = "Box", right = "owned heap pointer" },
]
"#;

  #[test]
  fn parses_toml_lesson() {
    let lesson = parse_lesson(Path::new("lesson.toml"), LESSON).unwrap();
    assert_eq!(lesson.title, "Rust basics");
    assert_eq!(lesson.description, "");
    assert_eq!(lesson.catalog.len(), 3);
    assert_eq!(lesson.catalog.total_xp(), 15);
    let pairs = lesson.catalog.get(2).unwrap();
    assert_eq!(pairs.xp_reward, 0);
    assert!(matches!(pairs.kind, ExerciseKind::MatchingPairs { .. }));
  }

  #[test]
  fn invalid_catalog_is_reported_with_path() {
    let broken = LESSON.replace(r#"correct_id = "m""#, r#"correct_id = "x""#);
    let err = parse_lesson(Path::new("lesson.toml"), &broken).unwrap_err();
    assert!(matches!(err, ConfigError::Catalog { .. }));
    assert!(err.to_string().contains("lesson.toml"));
  }

  #[test]
  fn oversized_xp_total_is_a_catalog_error() {
    let greedy = LESSON
      .replace("xp_reward = 10", "xp_reward = 3000000000")
      .replace("xp_reward = 5", "xp_reward = 3000000000");
    let err = parse_lesson(Path::new("lesson.toml"), &greedy).unwrap_err();
    assert!(matches!(err, ConfigError::Catalog { .. }));
    assert!(err.to_string().contains("order"));
  }

  #[test]
  fn syntax_errors_are_parse_errors() {
    let err = parse_lesson(Path::new("x.toml"), "title = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }

  #[test]
  fn bundled_sample_lesson_is_valid() {
    let text = include_str!("../lessons/rust_basics.toml");
    let lesson = parse_lesson(Path::new("lessons/rust_basics.toml"), text).unwrap();
    assert_eq!(lesson.catalog.len(), 4);
    assert_eq!(lesson.catalog.total_xp(), 60);
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = load_lesson(Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
