use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        leaderboard::LeaderboardView,
        session::{CelebrationView, CountdownView, FeedStatus},
        sse::{FeedRejectedEvent, ServerEvent},
    },
    state::{LeaderboardSession, SharedState, feed_session::AttemptId, session::MalformedFeedMessage},
};

pub(crate) const EVENT_LEADERBOARD: &str = "leaderboard";
pub(crate) const EVENT_FEED_PHASE: &str = "feed.phase";
pub(crate) const EVENT_COUNTDOWN: &str = "countdown";
pub(crate) const EVENT_CELEBRATION: &str = "celebration";
const EVENT_FEED_REJECTED: &str = "feed.rejected";

/// Broadcast the full projected leaderboard to presentation clients.
pub fn broadcast_leaderboard(state: &SharedState, session: &LeaderboardSession) {
    let payload = LeaderboardView::new(session.id(), &session.leaderboard());
    send_public_event(state, EVENT_LEADERBOARD, &payload);
}

/// Broadcast the visible feed phase to both streams.
pub fn broadcast_feed_phase(state: &SharedState, session: &LeaderboardSession) {
    let payload = FeedStatus::from(session);
    send_public_event(state, EVENT_FEED_PHASE, &payload);
    send_admin_event(state, EVENT_FEED_PHASE, &payload);
}

/// Broadcast the countdown snapshot.
pub fn broadcast_countdown(state: &SharedState, session: &LeaderboardSession) {
    let payload = CountdownView::from(session.countdown());
    send_public_event(state, EVENT_COUNTDOWN, &payload);
}

/// Broadcast the celebration state to both streams.
pub fn broadcast_celebration(state: &SharedState, session: &LeaderboardSession) {
    let payload = CelebrationView::from(session.celebration());
    send_public_event(state, EVENT_CELEBRATION, &payload);
    send_admin_event(state, EVENT_CELEBRATION, &payload);
}

/// Let both streams know a feed message was dropped and the previous leaderboard kept.
pub fn broadcast_feed_rejected(state: &SharedState, attempt: AttemptId, err: &MalformedFeedMessage) {
    let payload = FeedRejectedEvent {
        attempt,
        reason: err.to_string(),
    };
    send_public_event(state, EVENT_FEED_REJECTED, &payload);
    send_admin_event(state, EVENT_FEED_REJECTED, &payload);
}

/// Current state as the events a new subscriber would otherwise have to wait for.
pub(crate) fn snapshot_events(session: &LeaderboardSession) -> Vec<ServerEvent> {
    let mut events = Vec::with_capacity(4);
    push_json(
        &mut events,
        EVENT_LEADERBOARD,
        &LeaderboardView::new(session.id(), &session.leaderboard()),
    );
    push_json(&mut events, EVENT_FEED_PHASE, &FeedStatus::from(session));
    push_json(
        &mut events,
        EVENT_COUNTDOWN,
        &CountdownView::from(session.countdown()),
    );
    push_json(
        &mut events,
        EVENT_CELEBRATION,
        &CelebrationView::from(session.celebration()),
    );
    events
}

fn push_json(events: &mut Vec<ServerEvent>, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => events.push(event),
        Err(err) => warn!(event, error = %err, "failed to serialize snapshot SSE payload"),
    }
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

fn send_admin_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.admin_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize admin SSE payload"),
    }
}
