pub mod celebration;
pub mod countdown;
pub mod feed_session;
pub mod projection;
pub mod registry;
pub mod session;
mod sse;

use std::sync::Arc;

use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
};

use crate::{config::AppConfig, services::feed_transport::FeedConnector};

pub use self::session::{LeaderboardSession, SessionEffect, SessionError};
pub use self::sse::EventHub;
use self::sse::SseState;

pub type SharedState = Arc<AppState>;

/// The ranking session together with the background tasks currently driving it.
///
/// Everything that mutates the session holds the slot lock for the whole
/// handler, so feed frames, ticks and commands never interleave.
pub struct SessionSlot {
    /// Ranking core.
    pub session: LeaderboardSession,
    pub(crate) feed_task: Option<JoinHandle<()>>,
    pub(crate) ticker_task: Option<JoinHandle<()>>,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            session: LeaderboardSession::new(),
            feed_task: None,
            ticker_task: None,
        }
    }

    /// Replace the feed task, aborting the one it supersedes.
    pub(crate) fn install_feed_task(&mut self, task: JoinHandle<()>) {
        if let Some(previous) = self.feed_task.replace(task) {
            previous.abort();
        }
    }

    /// Abort the feed task, if any. Takes effect before the next await point of that task.
    pub(crate) fn abort_feed_task(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
        }
    }

    /// Replace the countdown ticker, aborting the one it supersedes.
    pub(crate) fn install_ticker_task(&mut self, task: JoinHandle<()>) {
        if let Some(previous) = self.ticker_task.replace(task) {
            previous.abort();
        }
    }

    /// Abort the countdown ticker, if any.
    pub(crate) fn abort_ticker_task(&mut self) {
        if let Some(task) = self.ticker_task.take() {
            task.abort();
        }
    }
}

/// Central application state: configuration, feed transport, the ranking session and event hubs.
pub struct AppState {
    config: AppConfig,
    connector: Arc<dyn FeedConnector>,
    slot: Mutex<SessionSlot>,
    sse: SseState,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, connector: Arc<dyn FeedConnector>) -> SharedState {
        let sse = SseState::new(config.public_sse_capacity(), config.admin_sse_capacity());
        Arc::new(Self {
            config,
            connector,
            slot: Mutex::new(SessionSlot::new()),
            sse,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Transport used to open feed channels.
    pub fn connector(&self) -> Arc<dyn FeedConnector> {
        self.connector.clone()
    }

    /// Lock the session slot for a complete handler run.
    pub async fn lock_session(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().await
    }

    /// Run a read-only closure against the session.
    pub async fn read_session<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&LeaderboardSession) -> T,
    {
        let guard = self.slot.lock().await;
        f(&guard.session)
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &EventHub {
        self.sse.public()
    }

    /// Broadcast hub used for the admin SSE stream.
    pub fn admin_sse(&self) -> &EventHub {
        self.sse.admin().hub()
    }

    /// Token guard that ensures a single admin SSE subscriber at a time.
    pub fn admin_token(&self) -> &Mutex<Option<String>> {
        self.sse.admin().token()
    }
}
