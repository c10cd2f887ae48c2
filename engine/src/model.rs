//! Draw data model
//!
//! Identifiers are plain database ids wrapped in newtypes so a store id can
//! never be passed where a user id is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Store primary key
    StoreId
);
id_type!(
    /// User primary key
    UserId
);
id_type!(
    /// Character primary key
    CharacterId
);

/// One character in a store's pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPoolEntry {
    pub store_id: StoreId,
    pub character_id: CharacterId,
    /// Relative probability mass (larger is drawn more often). Must be > 0.
    pub weight: i32,
    /// Inactive entries stay for history but never take part in a draw
    pub active: bool,
}

impl CharacterPoolEntry {
    /// Active entry
    pub fn new(store_id: StoreId, character_id: CharacterId, weight: i32) -> Self {
        Self {
            store_id,
            character_id,
            weight,
            active: true,
        }
    }

    /// Same entry, retired from the pool
    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Character awarded to a user at a store. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub user_id: UserId,
    pub store_id: StoreId,
    pub character_id: CharacterId,
    pub awarded_at: DateTime<Utc>,
}

/// Inventory state of a `(user, store)` pair: `Absent -> Awarded`, terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryState {
    Absent,
    Awarded(InventoryRecord),
}

impl InventoryState {
    pub fn record(&self) -> Option<&InventoryRecord> {
        match self {
            InventoryState::Absent => None,
            InventoryState::Awarded(record) => Some(record),
        }
    }

    pub fn is_awarded(&self) -> bool {
        matches!(self, InventoryState::Awarded(_))
    }
}

impl From<Option<InventoryRecord>> for InventoryState {
    fn from(record: Option<InventoryRecord>) -> Self {
        match record {
            Some(record) => InventoryState::Awarded(record),
            None => InventoryState::Absent,
        }
    }
}

/// `(character_id, weight)` pair as seen by a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshotEntry {
    pub character_id: CharacterId,
    pub weight: i32,
}

/// Outcome of a single draw. Not persisted as-is; `commit` turns it into an
/// `InventoryRecord`, and the snapshot goes to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub draw_id: Uuid,
    pub store_id: StoreId,
    pub user_id: UserId,
    pub character_id: CharacterId,
    /// Active entries considered, ascending `character_id`
    pub pool_snapshot: Vec<PoolSnapshotEntry>,
    /// Uniform value in `[0, total_weight)` that picked the winner
    pub roll: u64,
    pub total_weight: u64,
}

impl DrawResult {
    /// Probability the winner had at draw time
    pub fn winning_probability(&self) -> f64 {
        let winner_weight: u64 = self
            .pool_snapshot
            .iter()
            .filter(|entry| entry.character_id == self.character_id)
            .map(|entry| entry.weight as u64)
            .sum();
        winner_weight as f64 / self.total_weight as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_state_from_option() {
        assert_eq!(InventoryState::from(None), InventoryState::Absent);

        let record = InventoryRecord {
            user_id: UserId(1),
            store_id: StoreId(2),
            character_id: CharacterId(3),
            awarded_at: Utc::now(),
        };
        let state = InventoryState::from(Some(record.clone()));
        assert!(state.is_awarded());
        assert_eq!(state.record(), Some(&record));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let entry = PoolSnapshotEntry {
            character_id: CharacterId(12),
            weight: 4,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"character_id":12,"weight":4}"#);
    }

    #[test]
    fn test_winning_probability() {
        let result = DrawResult {
            draw_id: Uuid::nil(),
            store_id: StoreId(1),
            user_id: UserId(1),
            character_id: CharacterId(2),
            pool_snapshot: vec![
                PoolSnapshotEntry { character_id: CharacterId(1), weight: 1 },
                PoolSnapshotEntry { character_id: CharacterId(2), weight: 3 },
            ],
            roll: 2,
            total_weight: 4,
        };
        assert!((result.winning_probability() - 0.75).abs() < f64::EPSILON);
    }
}
