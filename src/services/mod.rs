/// Countdown ticker task.
pub mod countdown_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Feed connection task applying frames to the session.
pub mod feed_service;
/// Feed transport abstraction and its WebSocket implementation.
pub mod feed_transport;
/// Health check service.
pub mod health_service;
/// Public service for read-only leaderboard information.
pub mod public_service;
/// Operator commands and the session effect executor.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
