//! Operator commands against the ranking session, and the executor that turns
//! session effects into tasks and broadcasts.

use tracing::info;

use crate::{
    dto::{
        admin::{ActionResponse, CelebrationResponse, ConnectResponse, StartCountdownResponse},
        session::FeedStatus,
    },
    error::ServiceError,
    services::{countdown_service, feed_service, sse_events},
    state::{SessionEffect, SessionSlot, SharedState, countdown::StartOutcome},
};

/// Run `effects` in order against the locked slot.
///
/// Broadcasts read the session after the whole handler has applied its event,
/// so subscribers never observe an intermediate state.
pub(crate) fn execute(state: &SharedState, slot: &mut SessionSlot, effects: Vec<SessionEffect>) {
    for effect in effects {
        match effect {
            SessionEffect::OpenChannel(attempt) => {
                let task = tokio::spawn(feed_service::run(state.clone(), attempt));
                slot.install_feed_task(task);
            }
            SessionEffect::CloseChannel => slot.abort_feed_task(),
            SessionEffect::ScheduleTicks => {
                let task = tokio::spawn(countdown_service::run(state.clone()));
                slot.install_ticker_task(task);
            }
            SessionEffect::CancelTicks => slot.abort_ticker_task(),
            SessionEffect::LeaderboardChanged => {
                sse_events::broadcast_leaderboard(state, &slot.session)
            }
            SessionEffect::FeedPhaseChanged(_) => {
                sse_events::broadcast_feed_phase(state, &slot.session)
            }
            SessionEffect::CountdownChanged => sse_events::broadcast_countdown(state, &slot.session),
            SessionEffect::CelebrationChanged => {
                sse_events::broadcast_celebration(state, &slot.session)
            }
        }
    }
}

/// Open a new feed connection attempt.
pub async fn connect(state: &SharedState) -> Result<ConnectResponse, ServiceError> {
    let mut slot = state.lock_session().await;
    let effects = slot.session.connect()?;
    execute(state, &mut slot, effects);
    Ok(ConnectResponse {
        feed: FeedStatus::from(&slot.session),
    })
}

/// Start the countdown, using the configured length when `duration_secs` is absent.
pub async fn start_countdown(
    state: &SharedState,
    duration_secs: Option<u32>,
) -> Result<StartCountdownResponse, ServiceError> {
    let duration = duration_secs.unwrap_or_else(|| state.config().countdown_secs());
    let mut slot = state.lock_session().await;
    let (outcome, effects) = slot.session.start_countdown(duration)?;
    execute(state, &mut slot, effects);
    Ok(StartCountdownResponse {
        started: outcome == StartOutcome::Started,
        countdown: slot.session.countdown().into(),
    })
}

/// Celebrate whoever currently leads.
pub async fn activate_celebration(state: &SharedState) -> Result<CelebrationResponse, ServiceError> {
    let mut slot = state.lock_session().await;
    let effects = slot.session.activate_celebration()?;
    let changed = !effects.is_empty();
    execute(state, &mut slot, effects);
    Ok(CelebrationResponse {
        changed,
        celebration: slot.session.celebration().into(),
    })
}

/// Close the celebration.
pub async fn deactivate_celebration(
    state: &SharedState,
) -> Result<CelebrationResponse, ServiceError> {
    let mut slot = state.lock_session().await;
    let effects = slot.session.deactivate_celebration()?;
    let changed = !effects.is_empty();
    execute(state, &mut slot, effects);
    Ok(CelebrationResponse {
        changed,
        celebration: slot.session.celebration().into(),
    })
}

/// Close the feed, cancel the countdown ticker and clear the registry.
pub async fn teardown(state: &SharedState) -> ActionResponse {
    let mut slot = state.lock_session().await;
    let effects = slot.session.teardown();
    let message = if effects.is_empty() {
        "session already torn down"
    } else {
        "session torn down"
    };
    execute(state, &mut slot, effects);
    // Nothing can restart either task now, so drop whatever handles remain.
    slot.abort_feed_task();
    slot.abort_ticker_task();
    info!(session_id = %slot.session.id(), "teardown complete");

    ActionResponse {
        message: message.into(),
    }
}
