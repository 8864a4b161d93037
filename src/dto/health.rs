use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::session::VisibleFeedPhase;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Feed phase the status was derived from.
    pub feed: VisibleFeedPhase,
}

impl HealthResponse {
    /// The feed is live and the leaderboard is current.
    pub fn ok(feed: VisibleFeedPhase) -> Self {
        Self {
            status: "ok".to_string(),
            feed,
        }
    }

    /// The service runs but the leaderboard is not being updated.
    pub fn degraded(feed: VisibleFeedPhase) -> Self {
        Self {
            status: "degraded".to_string(),
            feed,
        }
    }
}
