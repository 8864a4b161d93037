use thiserror::Error;

/// Lifecycle phases of the connection to the ranking feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// No channel has been opened yet.
    Idle,
    /// A channel is being opened and a snapshot has been requested.
    Connecting,
    /// At least one snapshot arrived on the current channel.
    Live,
    /// The transport dropped; a manual connect may be issued.
    Disconnected,
    /// The session was closed for good; further messages are ignored.
    Closed,
}

/// Events that can be applied to the feed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// Open (or re-open) the channel to the feed.
    Connect,
    /// A full ranking snapshot was accepted.
    SnapshotReceived,
    /// The transport reported the channel as lost.
    ChannelLost,
    /// Teardown or countdown expiry closed the session.
    Close,
}

/// Identifier of a connection attempt. Frames carry the attempt that produced them.
pub type AttemptId = u64;

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the session was in when the event was received.
    pub from: FeedPhase,
    /// The event that cannot be applied from this phase.
    pub event: FeedEvent,
}

/// Result of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase before the event.
    pub from: FeedPhase,
    /// Phase after the event.
    pub to: FeedPhase,
}

impl Transition {
    /// Whether the event moved the session to a different phase.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Snapshot of the feed session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Current phase.
    pub phase: FeedPhase,
    /// Incremented on every phase change.
    pub version: usize,
    /// Most recent connection attempt, if any.
    pub attempt: Option<AttemptId>,
}

/// State machine for the feed connection lifecycle.
#[derive(Debug, Clone)]
pub struct FeedSession {
    phase: FeedPhase,
    version: usize,
    attempt: Option<AttemptId>,
    next_attempt: AttemptId,
}

impl Default for FeedSession {
    fn default() -> Self {
        Self {
            phase: FeedPhase::Idle,
            version: 0,
            attempt: None,
            next_attempt: 1,
        }
    }
}

impl FeedSession {
    /// Create a new session in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    /// Attempt whose channel is currently authoritative.
    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.attempt
    }

    /// Whether frames tagged with `attempt` should still be processed.
    pub fn accepts(&self, attempt: AttemptId) -> bool {
        self.attempt == Some(attempt)
            && matches!(self.phase, FeedPhase::Connecting | FeedPhase::Live)
    }

    /// Create a snapshot of the current state.
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            phase: self.phase,
            version: self.version,
            attempt: self.attempt,
        }
    }

    /// Start a new connection attempt and return its identifier.
    ///
    /// Any channel from an earlier attempt stops being authoritative.
    pub fn connect(&mut self) -> Result<AttemptId, InvalidTransition> {
        self.apply(FeedEvent::Connect)?;
        let attempt = self.next_attempt;
        self.next_attempt += 1;
        self.attempt = Some(attempt);
        Ok(attempt)
    }

    /// Apply an event, moving the session to the next phase.
    pub fn apply(&mut self, event: FeedEvent) -> Result<Transition, InvalidTransition> {
        let from = self.phase;
        let to = self.compute_transition(event)?;
        if from != to {
            self.phase = to;
            self.version += 1;
        }
        Ok(Transition { from, to })
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: FeedEvent) -> Result<FeedPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (FeedPhase::Idle | FeedPhase::Connecting | FeedPhase::Disconnected, FeedEvent::Connect) => {
                FeedPhase::Connecting
            }
            (FeedPhase::Connecting | FeedPhase::Live, FeedEvent::SnapshotReceived) => FeedPhase::Live,
            (
                FeedPhase::Connecting | FeedPhase::Live | FeedPhase::Disconnected,
                FeedEvent::ChannelLost,
            ) => FeedPhase::Disconnected,
            (FeedPhase::Closed, FeedEvent::ChannelLost) => FeedPhase::Closed,
            (_, FeedEvent::Close) => FeedPhase::Closed,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
