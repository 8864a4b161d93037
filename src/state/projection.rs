//! Ordered leaderboard derived from a registry snapshot, with rank deltas for
//! reorder animations.

use std::collections::HashMap;

use crate::state::registry::{Player, PlayerId, RegistrySnapshot};

/// Player placed on the leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    /// Player data as delivered by the feed.
    pub player: Player,
    /// 1-based position in this projection.
    pub rank: usize,
    /// Position in the previous projection, or `rank` when the player is new.
    pub previous_rank: usize,
}

impl RankedPlayer {
    /// Positions gained since the previous projection (negative when the player dropped).
    pub fn delta(&self) -> i64 {
        self.previous_rank as i64 - self.rank as i64
    }
}

/// Leaderboard sorted by descending score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedLeaderboard {
    entries: Vec<RankedPlayer>,
    ranks: HashMap<PlayerId, usize>,
}

impl ProjectedLeaderboard {
    /// Projection with no players, used before the first snapshot arrives.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Entries ordered from first to last place.
    pub fn entries(&self) -> &[RankedPlayer] {
        &self.entries
    }

    /// Rank held by `id`, if the player is on the board.
    pub fn rank_of(&self, id: PlayerId) -> Option<usize> {
        self.ranks.get(&id).copied()
    }

    /// Rank-1 entry, absent when the board is empty.
    pub fn leader(&self) -> Option<&RankedPlayer> {
        self.entries.first()
    }

    /// Number of ranked players.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no player is ranked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Project `snapshot` into a leaderboard, taking previous ranks from `previous`.
///
/// Players with equal scores keep the order they had in the snapshot, so a
/// re-projection of unchanged data never swaps rows.
pub fn project(previous: &ProjectedLeaderboard, snapshot: &RegistrySnapshot) -> ProjectedLeaderboard {
    let mut ordered: Vec<&Player> = snapshot.iter().collect();
    // `sort_by` is stable.
    ordered.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));

    let mut entries = Vec::with_capacity(ordered.len());
    let mut ranks = HashMap::with_capacity(ordered.len());

    for (index, player) in ordered.into_iter().enumerate() {
        let rank = index + 1;
        let previous_rank = previous.rank_of(player.id).unwrap_or(rank);
        ranks.insert(player.id, rank);
        entries.push(RankedPlayer {
            player: player.clone(),
            rank,
            previous_rank,
        });
    }

    ProjectedLeaderboard { entries, ranks }
}

/// `total_cmp` orders -0.0 below 0.0; treat them as the same score so they tie.
fn sort_key(score: f64) -> f64 {
    if score == 0.0 { 0.0 } else { score }
}
