//! Owner of the whole ranking core. Every external event (feed frame, tick,
//! operator command) goes through one method here, which updates state and
//! returns the effects the async shell must carry out.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::feed::{FeedDecodeError, FeedInbound},
    state::{
        celebration::Celebration,
        countdown::{Countdown, CountdownSnapshot, StartOutcome, TickOutcome},
        feed_session::{AttemptId, FeedEvent, FeedPhase, FeedSession, FeedSnapshot, InvalidTransition},
        projection::{ProjectedLeaderboard, project},
        registry::{DuplicateIdError, PlayerRegistry, RegistrySnapshot},
    },
};

/// A feed message that was rejected. The previous snapshot stays in place.
#[derive(Debug, Error)]
pub enum MalformedFeedMessage {
    /// The frame could not be decoded or lacked required fields.
    #[error(transparent)]
    Decode(#[from] FeedDecodeError),
    /// The snapshot listed a player id twice.
    #[error(transparent)]
    DuplicateId(#[from] DuplicateIdError),
}

/// Errors returned by [`LeaderboardSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was torn down; nothing is processed any more.
    #[error("session has been torn down")]
    TornDown,
    /// The frame belongs to a connection attempt that is no longer current.
    #[error("frame from superseded or closed connection attempt {attempt}")]
    StaleAttempt {
        /// Attempt that produced the frame.
        attempt: AttemptId,
    },
    /// The feed sent a message that could not be applied.
    #[error("malformed feed message: {0}")]
    Malformed(#[from] MalformedFeedMessage),
    /// The feed session cannot take this event in its current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

/// Work the async shell has to perform after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Open a channel for this attempt and send `getRanking` as soon as it is up.
    OpenChannel(AttemptId),
    /// Release the current feed channel.
    CloseChannel,
    /// Begin delivering countdown ticks.
    ScheduleTicks,
    /// Stop delivering countdown ticks.
    CancelTicks,
    /// The projected leaderboard changed.
    LeaderboardChanged,
    /// The feed session moved to a new phase.
    FeedPhaseChanged(FeedPhase),
    /// The countdown state changed.
    CountdownChanged,
    /// The celebration was activated or deactivated.
    CelebrationChanged,
}

/// Registry, projection, feed session, countdown and celebration under one owner.
#[derive(Debug)]
pub struct LeaderboardSession {
    id: Uuid,
    registry: PlayerRegistry,
    leaderboard: Arc<ProjectedLeaderboard>,
    feed: FeedSession,
    countdown: Countdown,
    celebration: Celebration,
    torn_down: bool,
}

impl Default for LeaderboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaderboardSession {
    /// Create a fresh session: empty registry, idle feed, countdown not started.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            registry: PlayerRegistry::new(),
            leaderboard: Arc::new(ProjectedLeaderboard::empty()),
            feed: FeedSession::new(),
            countdown: Countdown::new(),
            celebration: Celebration::new(),
            torn_down: false,
        }
    }

    /// Identifier of this session, regenerated on every process start.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current projected leaderboard.
    pub fn leaderboard(&self) -> Arc<ProjectedLeaderboard> {
        self.leaderboard.clone()
    }

    /// Current registry snapshot.
    pub fn registry(&self) -> Arc<RegistrySnapshot> {
        self.registry.current()
    }

    /// Feed session state.
    pub fn feed(&self) -> FeedSnapshot {
        self.feed.snapshot()
    }

    /// Countdown state.
    pub fn countdown(&self) -> CountdownSnapshot {
        self.countdown.snapshot()
    }

    /// Whether the countdown still expects ticks.
    pub fn countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// Celebration state.
    pub fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    /// Whether [`Self::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Open a new feed channel. Safe to repeat while connecting or after a disconnect.
    pub fn connect(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        self.ensure_active()?;
        let before = self.feed.phase();
        let attempt = self.feed.connect()?;
        info!(attempt, "connecting to ranking feed");

        let mut effects = Vec::with_capacity(2);
        if before != self.feed.phase() {
            effects.push(SessionEffect::FeedPhaseChanged(self.feed.phase()));
        }
        effects.push(SessionEffect::OpenChannel(attempt));
        Ok(effects)
    }

    /// Apply a text frame received on the channel opened for `attempt`.
    ///
    /// `ranking` and `rankingUpdate` both replace the registry and re-project
    /// the leaderboard exactly once. A rejected frame leaves everything as it was.
    pub fn on_feed_frame(
        &mut self,
        attempt: AttemptId,
        text: &str,
    ) -> Result<Vec<SessionEffect>, SessionError> {
        self.ensure_active()?;
        if !self.feed.accepts(attempt) {
            return Err(SessionError::StaleAttempt { attempt });
        }

        let (kind, players) = match FeedInbound::from_json_str(text).map_err(MalformedFeedMessage::from)? {
            FeedInbound::Snapshot { kind, players } => (kind, players),
            FeedInbound::Unknown(event) => {
                debug!(attempt, event = %event, "ignoring unknown feed event");
                return Ok(Vec::new());
            }
        };

        let was_empty = self.leaderboard.is_empty();
        let snapshot = self
            .registry
            .replace(players.into_iter().map(Into::into).collect())
            .map_err(MalformedFeedMessage::from)?;
        self.leaderboard = Arc::new(project(&self.leaderboard, &snapshot));
        debug!(
            attempt,
            event = kind.event_name(),
            players = snapshot.len(),
            "leaderboard re-projected"
        );

        let mut effects = vec![SessionEffect::LeaderboardChanged];
        let transition = self.feed.apply(FeedEvent::SnapshotReceived)?;
        if transition.changed() {
            info!(attempt, "ranking feed is live");
            effects.push(SessionEffect::FeedPhaseChanged(transition.to));
        } else if was_empty != self.leaderboard.is_empty() {
            // Still live, but presentation shows an empty feed differently.
            effects.push(SessionEffect::FeedPhaseChanged(transition.to));
        }
        Ok(effects)
    }

    /// Record that the channel for `attempt` went away.
    pub fn on_channel_lost(&mut self, attempt: AttemptId) -> Result<Vec<SessionEffect>, SessionError> {
        self.ensure_active()?;
        if !self.feed.accepts(attempt) {
            return Err(SessionError::StaleAttempt { attempt });
        }

        let transition = self.feed.apply(FeedEvent::ChannelLost)?;
        Ok(phase_effect(transition.changed(), transition.to))
    }

    /// Close the feed session. Closing twice is a no-op.
    pub fn close_feed(&mut self) -> Vec<SessionEffect> {
        let Ok(transition) = self.feed.apply(FeedEvent::Close) else {
            return Vec::new();
        };
        if !transition.changed() {
            return Vec::new();
        }
        info!(from = ?transition.from, "ranking feed closed");
        vec![
            SessionEffect::CloseChannel,
            SessionEffect::FeedPhaseChanged(transition.to),
        ]
    }

    /// Start the countdown with `duration` ticks. Ignored while one is running.
    pub fn start_countdown(
        &mut self,
        duration: u32,
    ) -> Result<(StartOutcome, Vec<SessionEffect>), SessionError> {
        self.ensure_active()?;
        let outcome = self.countdown.start(duration);
        let effects = match outcome {
            StartOutcome::Started => {
                info!(duration, "countdown started");
                vec![SessionEffect::CountdownChanged, SessionEffect::ScheduleTicks]
            }
            StartOutcome::AlreadyRunning => Vec::new(),
        };
        Ok((outcome, effects))
    }

    /// Advance the countdown by one unit.
    ///
    /// On expiry, activates the celebration with the current leader and then
    /// closes the feed. The countdown reports expiry once, so neither side
    /// effect can fire twice.
    pub fn tick(&mut self) -> Vec<SessionEffect> {
        if self.torn_down {
            return Vec::new();
        }

        match self.countdown.tick() {
            TickOutcome::Idle => Vec::new(),
            TickOutcome::Remaining(remaining) => {
                debug!(remaining, "countdown tick");
                vec![SessionEffect::CountdownChanged]
            }
            TickOutcome::Expired => {
                info!("countdown expired");
                let mut effects = vec![SessionEffect::CountdownChanged];
                effects.extend(self.celebrate_leader());
                effects.extend(self.close_feed());
                effects
            }
        }
    }

    /// Manually celebrate whoever currently leads.
    pub fn activate_celebration(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        self.ensure_active()?;
        Ok(self.celebrate_leader())
    }

    /// Close the celebration.
    pub fn deactivate_celebration(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        self.ensure_active()?;
        if self.celebration.deactivate() {
            info!("celebration closed");
            Ok(vec![SessionEffect::CelebrationChanged])
        } else {
            Ok(Vec::new())
        }
    }

    /// Close the feed, cancel the countdown and clear the registry. Afterwards
    /// every event is rejected or ignored. Repeated calls do nothing.
    pub fn teardown(&mut self) -> Vec<SessionEffect> {
        if self.torn_down {
            return Vec::new();
        }

        let mut effects = self.close_feed();
        effects.push(SessionEffect::CancelTicks);
        if self.countdown.cancel() {
            info!("countdown cancelled");
            effects.push(SessionEffect::CountdownChanged);
        }

        self.registry.clear();
        if !self.leaderboard.is_empty() {
            self.leaderboard = Arc::new(ProjectedLeaderboard::empty());
            effects.push(SessionEffect::LeaderboardChanged);
        }
        if self.celebration.deactivate() {
            effects.push(SessionEffect::CelebrationChanged);
        }

        self.torn_down = true;
        info!(session_id = %self.id, "session torn down");
        effects
    }

    fn celebrate_leader(&mut self) -> Vec<SessionEffect> {
        let leader_name = self
            .leaderboard
            .leader()
            .map(|entry| entry.player.name.clone())
            .unwrap_or_default();

        if self.celebration.activate(leader_name) {
            info!(leader = self.celebration.leader_name(), "celebration activated");
            vec![SessionEffect::CelebrationChanged]
        } else {
            Vec::new()
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.torn_down {
            Err(SessionError::TornDown)
        } else {
            Ok(())
        }
    }
}

fn phase_effect(changed: bool, phase: FeedPhase) -> Vec<SessionEffect> {
    if changed {
        vec![SessionEffect::FeedPhaseChanged(phase)]
    } else {
        Vec::new()
    }
}
