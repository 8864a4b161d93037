use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name; unnamed events arrive as `message`.
    pub event: Option<String>,
    /// SSE `data:` payload, usually JSON.
    pub data: String,
}

impl ServerEvent {
    /// Event with a plain-text data field.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent on the admin stream when an operator connects.
pub struct AdminHandshake {
    /// Token to pass in the `X-Admin-Token` header of admin commands.
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a feed message was rejected and the previous leaderboard kept.
pub struct FeedRejectedEvent {
    /// Connection attempt that delivered the message.
    pub attempt: u64,
    /// Why the message was rejected.
    pub reason: String,
}
