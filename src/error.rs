use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::state::SessionError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<SessionError> for ServiceError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::TornDown => ServiceError::InvalidState(err.to_string()),
            SessionError::InvalidTransition(invalid) => {
                ServiceError::InvalidState(invalid.to_string())
            }
            SessionError::StaleAttempt { .. } => ServiceError::InvalidState(err.to_string()),
            SessionError::Malformed(malformed) => ServiceError::InvalidInput(malformed.to_string()),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::feed_session::{FeedEvent, FeedPhase, InvalidTransition};

    #[test]
    fn session_errors_map_to_conflict() {
        let app: AppError = ServiceError::from(SessionError::TornDown).into();
        assert_eq!(app.into_response().status(), StatusCode::CONFLICT);

        let invalid = SessionError::InvalidTransition(InvalidTransition {
            from: FeedPhase::Closed,
            event: FeedEvent::Connect,
        });
        let app: AppError = ServiceError::from(invalid).into();
        assert!(matches!(&app, AppError::Conflict(message) if message.contains("Closed")));
        assert_eq!(app.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let app: AppError = ServiceError::Unauthorized("nope".into()).into();
        assert_eq!(app.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
