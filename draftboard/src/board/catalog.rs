// Player catalog: the loaded player list plus per-player drafted flags.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use super::player::{Player, PlayerId};

/// Keys every record must carry for the board to work with it.
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "pos", "team", "score"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("player data is not a JSON array")]
    NotAnArray,

    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index} is malformed: {source}")]
    InvalidRecord {
        index: usize,
        source: serde_json::Error,
    },

    #[error("failed to read player data from {location}: {message}")]
    Unreachable { location: String, message: String },

    #[error("player data from {location} is not valid JSON: {source}")]
    InvalidJson {
        location: String,
        source: serde_json::Error,
    },
}

/// Immutable-after-load player list with a mutable drafted set.
///
/// Drafted status is keyed by id, so records that share an id share their
/// flag. Player order is the order delivered by the data source.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<Player>,
    drafted: HashSet<PlayerId>,
}

impl PlayerCatalog {
    /// Build a catalog from raw JSON records.
    ///
    /// Duplicate ids are kept as-is; no dedup is performed.
    pub fn load(records: &Value) -> Result<Self, LoadError> {
        let items = records.as_array().ok_or(LoadError::NotAnArray)?;
        let mut players = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let obj = item
                .as_object()
                .ok_or(LoadError::NotAnObject { index })?;
            for field in REQUIRED_FIELDS {
                if !obj.contains_key(field) {
                    return Err(LoadError::MissingField { index, field });
                }
            }
            let player: Player = serde_json::from_value(item.clone())
                .map_err(|source| LoadError::InvalidRecord { index, source })?;
            players.push(player);
        }

        Ok(Self::from_players(players))
    }

    pub fn from_players(players: Vec<Player>) -> Self {
        PlayerCatalog {
            players,
            drafted: HashSet::new(),
        }
    }

    /// All players in catalog order.
    pub fn all(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }

    /// First player carrying `id`.
    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Mark a player drafted. Returns `false` (and changes nothing) when the id
    /// is unknown or already drafted.
    pub fn mark_drafted(&mut self, id: &PlayerId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.drafted.insert(id.clone())
    }

    /// Clear a player's drafted flag. Returns whether anything changed.
    pub fn mark_undrafted(&mut self, id: &PlayerId) -> bool {
        self.drafted.remove(id)
    }

    pub fn is_drafted(&self, id: &PlayerId) -> bool {
        self.drafted.contains(id)
    }

    /// Drafted ids in catalog order (each id once).
    pub fn drafted_ids(&self) -> Vec<PlayerId> {
        let mut seen = HashSet::new();
        self.players
            .iter()
            .filter(|p| self.drafted.contains(&p.id) && seen.insert(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Number of player records currently drafted.
    pub fn drafted_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| self.drafted.contains(&p.id))
            .count()
    }

    /// Number of player records still available.
    pub fn remaining_count(&self) -> usize {
        self.players.len() - self.drafted_count()
    }

    /// Undraft everyone.
    pub fn clear_drafted(&mut self) {
        self.drafted.clear();
    }
}
