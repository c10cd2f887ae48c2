//! Moree Character Draw Engine
//!
//! Weighted random selection over a store's character pool, with
//! one-character-per-user-per-store enforcement.
//!
//! # Components
//! - `model`: pool entries, inventory records, draw results
//! - `error`: draw error taxonomy and pool admission checks
//! - `draw`: the stateless engine (`DrawEngine`) and `commit`
//!
//! # Flow
//! ```text
//! PoolRepository ──► active pool ─┐
//!                                 ├─► DrawEngine::draw ─► DrawResult ─► commit ─► InventoryRecord
//! InventoryStore ──► record? ─────┘
//! ```
//!
//! The engine performs no I/O. Loading the pool, looking up an existing
//! record and persisting the committed record belong to the caller; the
//! storage layer's uniqueness constraint on `(user_id, store_id)` is the
//! authoritative duplicate guard under concurrency.
//!
//! # Example
//! ```
//! use moree_draw::{commit, CharacterId, CharacterPoolEntry, DrawEngine, StoreId, UserId};
//!
//! let store = StoreId(1);
//! let pool = vec![
//!     CharacterPoolEntry::new(store, CharacterId(10), 1),
//!     CharacterPoolEntry::new(store, CharacterId(20), 3),
//! ];
//!
//! let mut engine = DrawEngine::seeded(42);
//! let result = engine.draw(store, UserId(7), &pool, None).unwrap();
//! let record = commit(&result, UserId(7), store, chrono::Utc::now());
//! assert_eq!(record.character_id, result.character_id);
//! ```

pub mod draw;
pub mod error;
pub mod model;

#[cfg(test)]
mod tests;

pub use draw::{commit, select_weighted, DrawEngine};
pub use error::{validation, DrawError, DrawErrorResult, Severity};
pub use model::{
    CharacterId, CharacterPoolEntry, DrawResult, InventoryRecord, InventoryState,
    PoolSnapshotEntry, StoreId, UserId,
};
