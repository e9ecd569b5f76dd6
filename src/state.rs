//! Application state: the loaded lesson and the in-memory HTTP session store.
//!
//! This module owns:
//!   - the lesson (title, description, validated catalog)
//!   - HTTP-driven lesson sessions keyed by a random id
//!
//! WebSocket sessions never land here; each connection owns its own.
//! Sessions are ephemeral: dropping the process, deleting one, or leaving it
//! idle past `SessionLimits::idle_ttl` loses it. The store never holds more
//! than `SessionLimits::max_sessions`.

use std::time::{Duration, Instant};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{Lesson, SessionLimits};
use crate::engine::LessonSession;
use crate::logic::apply_message;
use crate::protocol::{
    to_snapshot, ActionOut, ClientMessage, LessonView, SessionCreatedOut, SnapshotOut,
};

/// How often the background sweeper looks for idle HTTP sessions.
pub const SWEEP_EVERY: Duration = Duration::from_secs(60);

/// One HTTP-driven activation: the engine session plus the view its client saw.
#[derive(Debug, Clone)]
pub struct HostedSession {
    pub session: LessonSession,
    pub view: LessonView,
    pub last_touched: Instant,
}

impl HostedSession {
    fn is_idle(&self, idle_ttl: Duration) -> bool {
        self.last_touched.elapsed() >= idle_ttl
    }
}

#[derive(Clone)]
pub struct AppState {
    pub lesson: Arc<Lesson>,
    pub sessions: Arc<RwLock<HashMap<String, HostedSession>>>,
    pub limits: SessionLimits,
}

impl AppState {
    pub fn new(lesson: Lesson) -> Self {
        Self::with_limits(lesson, SessionLimits::default())
    }

    pub fn with_limits(lesson: Lesson, limits: SessionLimits) -> Self {
        info!(
            target: "lesson",
            title = %lesson.title,
            exercises = lesson.catalog.len(),
            total_xp = lesson.catalog.total_xp(),
            max_sessions = limits.max_sessions,
            idle_secs = limits.idle_ttl.as_secs(),
            "Lesson ready"
        );
        Self {
            lesson: Arc::new(lesson),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limits,
        }
    }

    /// Fresh answer-free view of the lesson (new shuffle, new tokens).
    pub fn lesson_view(&self) -> LessonView {
        LessonView::build(
            &self.lesson.title,
            &self.lesson.description,
            &self.lesson.catalog,
        )
    }

    /// A new session in `intro`, ready for `start_lesson`.
    pub fn new_session(&self) -> HostedSession {
        HostedSession {
            session: LessonSession::new(self.lesson.catalog.clone()),
            view: self.lesson_view(),
            last_touched: Instant::now(),
        }
    }

    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> SessionCreatedOut {
        let hosted = self.new_session();
        let id = Uuid::new_v4().to_string();
        let out = SessionCreatedOut {
            session_id: id.clone(),
            lesson: hosted.view.out().clone(),
            state: to_snapshot(&hosted.session),
        };
        let mut sessions = self.sessions.write().await;
        let expired = evict_idle(&mut sessions, self.limits.idle_ttl);
        while sessions.len() >= self.limits.max_sessions {
            let Some(stalest) = sessions
                .iter()
                .min_by_key(|(_, h)| h.last_touched)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            sessions.remove(&stalest);
            info!(target: "lesson", session_id = %stalest, "Session evicted: store full");
        }
        sessions.insert(id.clone(), hosted);
        info!(target: "lesson", session_id = %id, expired, live = sessions.len(), "Session created");
        out
    }

    /// Current snapshot; reading a session counts as activity.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn snapshot(&self, id: &str) -> Option<SnapshotOut> {
        let mut sessions = self.sessions.write().await;
        let hosted = sessions.get_mut(id)?;
        hosted.last_touched = Instant::now();
        Some(to_snapshot(&hosted.session))
    }

    /// Apply one client message to a stored session. `None` if the id is
    /// unknown; `Some(None)` if the message is not an action.
    #[instrument(level = "info", skip(self, msg), fields(%id))]
    pub async fn dispatch(&self, id: &str, msg: ClientMessage) -> Option<Option<ActionOut>> {
        let mut sessions = self.sessions.write().await;
        let hosted = sessions.get_mut(id)?;
        hosted.last_touched = Instant::now();
        Some(apply_message(hosted, msg))
    }

    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn end_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        if let Some(h) = &removed {
            let s = h.session.state();
            info!(target: "lesson", session_id = %id, phase = ?s.phase, xp = s.xp_earned, "Session ended");
        }
        removed.is_some()
    }

    /// Drop every session idle past the configured TTL. Returns how many went.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let expired = evict_idle(&mut sessions, self.limits.idle_ttl);
        if expired > 0 {
            info!(target: "lesson", expired, live = sessions.len(), "Idle sessions swept");
        }
        expired
    }
}

fn evict_idle(sessions: &mut HashMap<String, HostedSession>, idle_ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|id, h| {
        let keep = !h.is_idle(idle_ttl);
        if !keep {
            debug!(target: "lesson", session_id = %id, "Session expired");
        }
        keep
    });
    before - sessions.len()
}

/// Background task that sweeps idle sessions every [`SWEEP_EVERY`].
pub fn spawn_session_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SWEEP_EVERY);
        loop {
            tick.tick().await;
            state.sweep_idle().await;
        }
    })
}
