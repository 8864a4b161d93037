/// Lifecycle of the countdown that ends in the celebration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    /// No countdown has been requested yet.
    NotStarted,
    /// Counting down; `remaining` ticks are left.
    Running {
        /// Ticks left before expiry.
        remaining: u32,
    },
    /// The countdown reached zero.
    Expired,
    /// Stopped by teardown before reaching zero.
    Cancelled {
        /// Ticks that were left when it stopped.
        remaining: u32,
    },
}

/// Outcome of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The countdown is now running with the given duration.
    Started,
    /// A countdown was already running; nothing changed.
    AlreadyRunning,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is running; the tick was ignored.
    Idle,
    /// One unit elapsed and time is still left.
    Remaining(u32),
    /// This tick expired the countdown. Reported once per start.
    Expired,
}

/// Snapshot exposed to presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownSnapshot {
    /// Current phase.
    pub phase: CountdownPhase,
    /// Duration requested by the last start, in ticks.
    pub duration: u32,
}

impl CountdownSnapshot {
    /// Ticks left; frozen once cancelled, zero when not started or expired.
    pub fn remaining(&self) -> u32 {
        match self.phase {
            CountdownPhase::Running { remaining } | CountdownPhase::Cancelled { remaining } => {
                remaining
            }
            CountdownPhase::NotStarted | CountdownPhase::Expired => 0,
        }
    }
}

/// Countdown state machine. Has no notion of wall time; the caller feeds ticks.
#[derive(Debug, Clone)]
pub struct Countdown {
    phase: CountdownPhase,
    duration: u32,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            phase: CountdownPhase::NotStarted,
            duration: 0,
        }
    }
}

impl Countdown {
    /// Create a countdown that has not been started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    /// Whether ticks are currently being counted.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, CountdownPhase::Running { .. })
    }

    /// Snapshot for presentation.
    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            phase: self.phase,
            duration: self.duration,
        }
    }

    /// Start counting `duration` ticks. A running countdown is left untouched.
    ///
    /// Starting from `Expired` begins a fresh countdown.
    pub fn start(&mut self, duration: u32) -> StartOutcome {
        if self.is_running() {
            return StartOutcome::AlreadyRunning;
        }
        self.duration = duration;
        self.phase = CountdownPhase::Running {
            remaining: duration,
        };
        StartOutcome::Started
    }

    /// Stop a running countdown without expiring it. Returns `false` if nothing was running.
    pub fn cancel(&mut self) -> bool {
        let CountdownPhase::Running { remaining } = self.phase else {
            return false;
        };
        self.phase = CountdownPhase::Cancelled { remaining };
        true
    }

    /// Advance by one unit.
    pub fn tick(&mut self) -> TickOutcome {
        let CountdownPhase::Running { remaining } = self.phase else {
            return TickOutcome::Idle;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.phase = CountdownPhase::Expired;
            TickOutcome::Expired
        } else {
            self.phase = CountdownPhase::Running { remaining };
            TickOutcome::Remaining(remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_started() {
        let countdown = Countdown::new();
        assert_eq!(countdown.phase(), CountdownPhase::NotStarted);
        assert_eq!(countdown.snapshot().remaining(), 0);
    }

    #[test]
    fn tick_before_start_is_ignored() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.tick(), TickOutcome::Idle);
        assert_eq!(countdown.phase(), CountdownPhase::NotStarted);
    }

    #[test]
    fn second_start_does_not_reset() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.start(180), StartOutcome::Started);
        countdown.tick();
        countdown.tick();

        assert_eq!(countdown.start(180), StartOutcome::AlreadyRunning);
        assert_eq!(countdown.phase(), CountdownPhase::Running { remaining: 178 });

        assert_eq!(countdown.start(5), StartOutcome::AlreadyRunning);
        assert_eq!(countdown.snapshot().duration, 180);
    }

    #[test]
    fn expires_after_duration_ticks_exactly_once() {
        let mut countdown = Countdown::new();
        countdown.start(180);

        let mut expired = 0;
        for _ in 0..179 {
            assert!(matches!(countdown.tick(), TickOutcome::Remaining(_)));
        }
        assert_eq!(countdown.snapshot().remaining(), 1);

        for _ in 0..5 {
            if countdown.tick() == TickOutcome::Expired {
                expired += 1;
            }
        }

        assert_eq!(expired, 1);
        assert_eq!(countdown.phase(), CountdownPhase::Expired);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let mut countdown = Countdown::new();
        countdown.start(0);
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.tick(), TickOutcome::Idle);
    }

    #[test]
    fn restart_after_expiry_uses_fresh_duration() {
        let mut countdown = Countdown::new();
        countdown.start(1);
        assert_eq!(countdown.tick(), TickOutcome::Expired);

        assert_eq!(countdown.start(3), StartOutcome::Started);
        assert_eq!(countdown.phase(), CountdownPhase::Running { remaining: 3 });
    }

    #[test]
    fn cancel_freezes_remaining_and_ignores_ticks() {
        let mut countdown = Countdown::new();
        assert!(!countdown.cancel());

        countdown.start(5);
        countdown.tick();
        assert!(countdown.cancel());
        assert!(!countdown.is_running());
        assert_eq!(countdown.phase(), CountdownPhase::Cancelled { remaining: 4 });
        assert_eq!(countdown.snapshot().remaining(), 4);

        assert_eq!(countdown.tick(), TickOutcome::Idle);
        assert!(!countdown.cancel());
    }
}
