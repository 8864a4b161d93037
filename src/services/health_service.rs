use tracing::debug;

use crate::{
    dto::{health::HealthResponse, session::VisibleFeedPhase},
    state::SharedState,
};

/// Report `ok` while the feed is live, `degraded` otherwise.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let phase = state
        .read_session(|session| {
            VisibleFeedPhase::new(session.feed().phase, session.leaderboard().is_empty())
        })
        .await;

    match phase {
        VisibleFeedPhase::Live | VisibleFeedPhase::Empty => HealthResponse::ok(phase),
        _ => {
            debug!(?phase, "feed not live; reporting degraded");
            HealthResponse::degraded(phase)
        }
    }
}
