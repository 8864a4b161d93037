use std::sync::Arc;

use indexmap::{IndexMap, map::Entry};
use thiserror::Error;

/// Identifier assigned to a player by the feed. Stable across updates.
pub type PlayerId = i64;

/// Player as last reported by the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Feed-assigned identifier.
    pub id: PlayerId,
    /// Display name, not guaranteed to be unique.
    pub name: String,
    /// Current score. May go up or down between snapshots.
    pub score: f64,
}

/// Raised when a snapshot lists the same player id more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate player id `{id}` in snapshot")]
pub struct DuplicateIdError {
    /// The id that appeared twice.
    pub id: PlayerId,
}

/// Full set of players keyed by id, in the order the feed delivered them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    players: IndexMap<PlayerId, Player>,
}

impl RegistrySnapshot {
    /// Build a snapshot, rejecting inputs with repeated ids.
    pub fn from_players(players: Vec<Player>) -> Result<Self, DuplicateIdError> {
        let mut map = IndexMap::with_capacity(players.len());
        for player in players {
            match map.entry(player.id) {
                Entry::Occupied(_) => return Err(DuplicateIdError { id: player.id }),
                Entry::Vacant(slot) => {
                    slot.insert(player);
                }
            }
        }
        Ok(Self { players: map })
    }

    /// Players in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Look a player up by id.
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Number of players in the snapshot.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the snapshot holds no players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Holds the authoritative snapshot, swapped wholesale on every feed message.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    current: Arc<RegistrySnapshot>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot. On error the previous snapshot is left untouched.
    pub fn replace(&mut self, players: Vec<Player>) -> Result<Arc<RegistrySnapshot>, DuplicateIdError> {
        let snapshot = Arc::new(RegistrySnapshot::from_players(players)?);
        self.current = snapshot.clone();
        Ok(snapshot)
    }

    /// Read-only view of the present snapshot.
    pub fn current(&self) -> Arc<RegistrySnapshot> {
        self.current.clone()
    }

    /// Drop every player, returning to the empty snapshot.
    pub fn clear(&mut self) {
        self.current = Arc::new(RegistrySnapshot::default());
    }
}
