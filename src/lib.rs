//! Demo lesson engine: a pure state machine over a fixed exercise catalog,
//! plus the HTTP/WebSocket host that drives it.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod logic;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod validate;

pub use catalog::{Catalog, CatalogError};
pub use engine::{transition, Action, LessonSession};
pub use session::{Phase, SessionState, MAX_LIVES};
