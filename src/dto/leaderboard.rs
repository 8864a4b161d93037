use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    state::projection::{ProjectedLeaderboard, RankedPlayer},
};

/// Medal shown next to the first three places.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Podium {
    /// First place.
    Gold,
    /// Second place.
    Silver,
    /// Third place.
    Bronze,
}

impl Podium {
    fn for_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Podium::Gold),
            2 => Some(Podium::Silver),
            3 => Some(Podium::Bronze),
            _ => None,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LeaderboardEntry {
    /// Player id as sent by the feed.
    pub id: i64,
    /// Display name; not necessarily unique.
    pub name: String,
    /// Score as sent by the feed.
    pub score: f64,
    /// 1-based position.
    pub rank: usize,
    /// Position in the previous projection (equal to `rank` for newcomers).
    pub previous_rank: usize,
    /// `previous_rank - rank`: positive when the player climbed. Drives the reorder animation.
    pub delta: i64,
    /// Medal for the first three places.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podium: Option<Podium>,
}

impl From<&RankedPlayer> for LeaderboardEntry {
    fn from(value: &RankedPlayer) -> Self {
        Self {
            id: value.player.id,
            name: value.player.name.clone(),
            score: value.player.score,
            rank: value.rank,
            previous_rank: value.previous_rank,
            delta: value.delta(),
            podium: Podium::for_rank(value.rank),
        }
    }
}

/// Full projected leaderboard as sent to presentation clients.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LeaderboardView {
    /// Session the board belongs to.
    pub session_id: Uuid,
    /// Rows, best score first.
    pub entries: Vec<LeaderboardEntry>,
    /// Name of the rank-1 player, absent while the board is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    /// RFC 3339 time at which this view was produced.
    pub generated_at: String,
}

impl LeaderboardView {
    /// Render `board` for the session `session_id`.
    pub fn new(session_id: Uuid, board: &ProjectedLeaderboard) -> Self {
        Self {
            session_id,
            entries: board.entries().iter().map(LeaderboardEntry::from).collect(),
            leader: board.leader().map(|entry| entry.player.name.clone()),
            generated_at: format_system_time(SystemTime::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        projection::project,
        registry::{Player, RegistrySnapshot},
    };

    #[test]
    fn view_marks_podium_and_leader() {
        let snapshot = RegistrySnapshot::from_players(
            (1..=4)
                .map(|id| Player {
                    id,
                    name: format!("P{id}"),
                    score: id as f64,
                })
                .collect(),
        )
        .unwrap();
        let board = project(&ProjectedLeaderboard::empty(), &snapshot);
        let view = LeaderboardView::new(Uuid::nil(), &board);

        assert_eq!(view.leader.as_deref(), Some("P4"));
        let podiums: Vec<_> = view.entries.iter().map(|e| e.podium).collect();
        assert_eq!(
            podiums,
            vec![Some(Podium::Gold), Some(Podium::Silver), Some(Podium::Bronze), None]
        );

        let json = serde_json::to_value(&view.entries[3]).unwrap();
        assert!(json.get("podium").is_none());
        assert_eq!(json["delta"], 0);
    }
}
