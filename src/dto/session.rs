use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    LeaderboardSession,
    celebration::Celebration,
    countdown::{CountdownPhase, CountdownSnapshot},
    feed_session::FeedPhase,
};

/// Feed state as presentation sees it.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleFeedPhase {
    /// Waiting for the first snapshot.
    Loading,
    /// Receiving updates.
    Live,
    /// Live, but the feed reported no players.
    Empty,
    /// The channel dropped; the last leaderboard is stale.
    Disconnected,
    /// The session ended (teardown or countdown expiry).
    Closed,
}

impl VisibleFeedPhase {
    /// Combine the feed phase with whether the board has any players.
    pub fn new(phase: FeedPhase, board_is_empty: bool) -> Self {
        match phase {
            FeedPhase::Idle | FeedPhase::Connecting => VisibleFeedPhase::Loading,
            FeedPhase::Live if board_is_empty => VisibleFeedPhase::Empty,
            FeedPhase::Live => VisibleFeedPhase::Live,
            FeedPhase::Disconnected => VisibleFeedPhase::Disconnected,
            FeedPhase::Closed => VisibleFeedPhase::Closed,
        }
    }
}

/// Feed status block.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct FeedStatus {
    /// Phase as presentation shows it.
    pub phase: VisibleFeedPhase,
    /// Current connection attempt, if one was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u64>,
    /// Bumped on every feed phase change.
    pub version: usize,
}

impl From<&LeaderboardSession> for FeedStatus {
    fn from(session: &LeaderboardSession) -> Self {
        let feed = session.feed();
        Self {
            phase: VisibleFeedPhase::new(feed.phase, session.leaderboard().is_empty()),
            attempt: feed.attempt,
            version: feed.version,
        }
    }
}

/// Countdown phase as exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleCountdownPhase {
    /// No countdown requested yet.
    NotStarted,
    /// Counting down.
    Running,
    /// Reached zero; the leader was celebrated.
    Expired,
    /// Stopped by teardown before reaching zero.
    Cancelled,
}

/// Countdown status block.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct CountdownView {
    /// Countdown lifecycle phase.
    pub phase: VisibleCountdownPhase,
    /// Units left; frozen once cancelled, zero when not started or expired.
    pub remaining: u32,
    /// Units requested by the last start.
    pub duration: u32,
}

impl From<CountdownSnapshot> for CountdownView {
    fn from(value: CountdownSnapshot) -> Self {
        let phase = match value.phase {
            CountdownPhase::NotStarted => VisibleCountdownPhase::NotStarted,
            CountdownPhase::Running { .. } => VisibleCountdownPhase::Running,
            CountdownPhase::Expired => VisibleCountdownPhase::Expired,
            CountdownPhase::Cancelled { .. } => VisibleCountdownPhase::Cancelled,
        };
        Self {
            phase,
            remaining: value.remaining(),
            duration: value.duration,
        }
    }
}

/// Celebration status block.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct CelebrationView {
    /// Whether the celebration is showing.
    pub celebrating: bool,
    /// Leader captured at activation; empty when inactive or nobody led.
    pub leader_name: String,
}

impl From<&Celebration> for CelebrationView {
    fn from(value: &Celebration) -> Self {
        Self {
            celebrating: value.is_active(),
            leader_name: value.leader_name().to_string(),
        }
    }
}

/// Everything presentation needs besides the leaderboard itself.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SessionView {
    /// Session identifier, stable until restart.
    pub session_id: Uuid,
    /// Set once the session was torn down; nothing changes afterwards.
    pub torn_down: bool,
    /// Feed connection status.
    pub feed: FeedStatus,
    /// Countdown status.
    pub countdown: CountdownView,
    /// Celebration status.
    pub celebration: CelebrationView,
}

impl From<&LeaderboardSession> for SessionView {
    fn from(session: &LeaderboardSession) -> Self {
        Self {
            session_id: session.id(),
            torn_down: session.is_torn_down(),
            feed: session.into(),
            countdown: session.countdown().into(),
            celebration: session.celebration().into(),
        }
    }
}
