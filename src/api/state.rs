use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ai::chat::{Chat, ChatBuilder};
use crate::ai::notice::ErrorNotice;
use crate::core::AppConfig;

/// Everything kept for one browser session
pub struct BrowserSession {
    pub chat: Chat,
    // Shown once on the next page render after a failed turn
    pub notice: Option<ErrorNotice>,
}

impl BrowserSession {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            chat: ChatBuilder::from_config(config).build(),
            notice: None,
        }
    }
}

/// Sessions are locked independently so a slow model call only blocks
/// the session that made it.
pub type SharedSession = Arc<Mutex<BrowserSession>>;

/// Most sessions kept at once. The least recently seen is dropped
/// first.
pub const MAX_SESSIONS: usize = 1000;

/// Sessions not seen for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24);

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

pub struct AppState {
    pub config: AppConfig,
    sessions: HashMap<String, SessionEntry>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            max_sessions: MAX_SESSIONS,
            idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    pub fn with_session_limits(mut self, max_sessions: usize, idle_timeout: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.idle_timeout = idle_timeout;
        self
    }

    /// Look up a session by ID or start a new one. Unknown or expired
    /// IDs (for example from before a restart) get a fresh session and
    /// ID.
    pub fn session(&mut self, id: Option<&str>) -> (String, SharedSession) {
        if let Some(id) = id
            && let Some(entry) = self.sessions.get_mut(id)
            && entry.last_seen.elapsed() < self.idle_timeout
        {
            entry.last_seen = Instant::now();
            return (id.to_string(), Arc::clone(&entry.session));
        }

        self.prune();

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(BrowserSession::new(&self.config)));
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!("Started session {}", id);
        (id, session)
    }

    /// Drop idle sessions and make room for one more
    fn prune(&mut self) {
        let idle_timeout = self.idle_timeout;
        self.sessions
            .retain(|_, entry| entry.last_seen.elapsed() < idle_timeout);

        while self.sessions.len() >= self.max_sessions {
            let Some(oldest) = self
                .sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            tracing::debug!("Evicting session {}", oldest);
            self.sessions.remove(&oldest);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
