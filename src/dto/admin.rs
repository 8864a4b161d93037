//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::session::{CelebrationView, CountdownView, FeedStatus};

/// Longest countdown an operator may request, in units.
pub const MAX_COUNTDOWN_SECS: u32 = 86_400;

/// Request to start the countdown.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct StartCountdownRequest {
    /// Length in units; the configured default is used when omitted.
    #[serde(default)]
    #[validate(range(min = 1, max = 86_400))]
    pub duration_secs: Option<u32>,
}

/// Result of a start request.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartCountdownResponse {
    /// `false` when a countdown was already running and nothing changed.
    pub started: bool,
    /// Countdown state after the request.
    pub countdown: CountdownView,
}

/// Result of a celebration command.
#[derive(Debug, Serialize, ToSchema)]
pub struct CelebrationResponse {
    /// `false` when the command did not change anything.
    pub changed: bool,
    /// Celebration state after the command.
    pub celebration: CelebrationView,
}

/// Result of a manual connect request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectResponse {
    /// Feed status including the new attempt id.
    pub feed: FeedStatus,
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable outcome.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_optional() {
        let request: StartCountdownRequest = serde_json::from_str("{}").unwrap();
        assert!(request.duration_secs.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn duration_bounds_are_enforced() {
        let zero = StartCountdownRequest {
            duration_secs: Some(0),
        };
        assert!(zero.validate().is_err());

        let too_long = StartCountdownRequest {
            duration_secs: Some(MAX_COUNTDOWN_SECS + 1),
        };
        assert!(too_long.validate().is_err());

        let ok = StartCountdownRequest {
            duration_secs: Some(180),
        };
        assert!(ok.validate().is_ok());
    }
}
