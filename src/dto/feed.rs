//! Wire format of the ranking feed channel.
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::registry::Player;

const EVENT_RANKING: &str = "ranking";
const EVENT_RANKING_UPDATE: &str = "rankingUpdate";

/// Messages sent to the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "event")]
pub enum FeedOutbound {
    /// Ask the feed for the current snapshot.
    #[serde(rename = "getRanking")]
    GetRanking,
}

impl FeedOutbound {
    /// Encode the message as a text frame payload.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Player entry as carried by `ranking` and `rankingUpdate` payloads.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PlayerPayload {
    /// Stable player id; unique within a snapshot.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: f64,
}

impl From<PlayerPayload> for Player {
    fn from(value: PlayerPayload) -> Self {
        Self {
            id: value.id,
            name: value.name,
            score: value.score,
        }
    }
}

/// Which inbound event carried a snapshot. Both are handled as full replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Reply to `getRanking`, also pushed on connect.
    Ranking,
    /// Pushed whenever a score changes.
    RankingUpdate,
}

impl SnapshotKind {
    /// Event name on the wire.
    pub fn event_name(self) -> &'static str {
        match self {
            SnapshotKind::Ranking => EVENT_RANKING,
            SnapshotKind::RankingUpdate => EVENT_RANKING_UPDATE,
        }
    }
}

/// Decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedInbound {
    /// Full snapshot of every player.
    Snapshot {
        /// Event that carried the snapshot.
        kind: SnapshotKind,
        /// Players in the order the feed sent them.
        players: Vec<PlayerPayload>,
    },
    /// Event this service does not understand.
    Unknown(String),
}

/// Failure to decode an inbound frame.
#[derive(Debug, Error)]
pub enum FeedDecodeError {
    /// The frame is not a JSON envelope.
    #[error("frame is not a valid envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    /// A snapshot event arrived without a payload.
    #[error("`{event}` frame has no data")]
    MissingData {
        /// Event name.
        event: &'static str,
    },
    /// The payload is not a list of complete player entries.
    #[error("`{event}` payload is invalid: {source}")]
    Payload {
        /// Event name.
        event: &'static str,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl FeedInbound {
    /// Decode a text frame received from the feed.
    pub fn from_json_str(text: &str) -> Result<Self, FeedDecodeError> {
        let envelope: RawEnvelope = serde_json::from_str(text).map_err(FeedDecodeError::Envelope)?;

        let kind = match envelope.event.as_str() {
            EVENT_RANKING => SnapshotKind::Ranking,
            EVENT_RANKING_UPDATE => SnapshotKind::RankingUpdate,
            _ => return Ok(FeedInbound::Unknown(envelope.event)),
        };
        let event = kind.event_name();

        let data = envelope
            .data
            .filter(|value| !value.is_null())
            .ok_or(FeedDecodeError::MissingData { event })?;
        let players = serde_json::from_value::<Vec<PlayerPayload>>(data)
            .map_err(|source| FeedDecodeError::Payload { event, source })?;

        Ok(FeedInbound::Snapshot { kind, players })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_ranking_encodes_as_bare_event() {
        let json = FeedOutbound::GetRanking.to_json_string().unwrap();
        assert_eq!(json, r#"{"event":"getRanking"}"#);
    }

    #[test]
    fn decodes_ranking_and_update() {
        let ranking = FeedInbound::from_json_str(
            r#"{"event":"ranking","data":[{"id":1,"name":"A","score":10},{"id":2,"name":"B","score":20.5}]}"#,
        )
        .unwrap();
        match ranking {
            FeedInbound::Snapshot { kind, players } => {
                assert_eq!(kind, SnapshotKind::Ranking);
                assert_eq!(players.len(), 2);
                assert_eq!(players[1].score, 20.5);
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        let update =
            FeedInbound::from_json_str(r#"{"event":"rankingUpdate","data":[]}"#).unwrap();
        assert_eq!(
            update,
            FeedInbound::Snapshot {
                kind: SnapshotKind::RankingUpdate,
                players: vec![],
            }
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let frame = FeedInbound::from_json_str(
            r#"{"event":"ranking","data":[{"id":1,"name":"A","score":1,"avatar":"x.png"}]}"#,
        )
        .unwrap();
        assert!(matches!(frame, FeedInbound::Snapshot { .. }));
    }

    #[test]
    fn missing_score_is_rejected() {
        let err = FeedInbound::from_json_str(r#"{"event":"ranking","data":[{"id":1,"name":"A"}]}"#)
            .unwrap_err();
        assert!(matches!(err, FeedDecodeError::Payload { event: "ranking", .. }));
    }

    #[test]
    fn missing_data_is_rejected() {
        let err = FeedInbound::from_json_str(r#"{"event":"rankingUpdate"}"#).unwrap_err();
        assert!(matches!(err, FeedDecodeError::MissingData { event: "rankingUpdate" }));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            FeedInbound::from_json_str("not json"),
            Err(FeedDecodeError::Envelope(_))
        ));
    }

    #[test]
    fn unknown_events_are_surfaced() {
        let frame = FeedInbound::from_json_str(r#"{"event":"chat","data":"hi"}"#).unwrap();
        assert_eq!(frame, FeedInbound::Unknown("chat".into()));
    }
}
