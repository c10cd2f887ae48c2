//! Weighted Draw Engine
//!
//! Cumulative-weight selection over a store's active pool.
//!
//! # Algorithm
//! 1. `total_weight = Σ weight` over the active entries
//! 2. `r` uniform in `[0, total_weight)`
//! 3. walk the entries in ascending `character_id`, accumulating weight;
//!    the first entry whose cumulative weight exceeds `r` wins
//!
//! Any fixed walking order yields the same distribution. The order is fixed
//! so that a seeded engine reproduces the same winners and the audit
//! snapshot explains them.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{validation, DrawError, DrawErrorResult};
use crate::model::{
    CharacterId, CharacterPoolEntry, DrawResult, InventoryRecord, PoolSnapshotEntry, StoreId,
    UserId,
};

/// Stateless draw engine. The only thing it owns is its random source.
pub struct DrawEngine<R = StdRng> {
    rng: R,
}

impl DrawEngine<StdRng> {
    /// Reproducible engine: the same seed yields the same sequence of draws
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Engine seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> DrawEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one character for `user_id` at `store_id`.
    ///
    /// `pool` is the store's configured pool as loaded by the caller;
    /// inactive entries are skipped. `existing_record` is the user's current
    /// inventory record for this store, if any.
    ///
    /// # Errors
    /// - `DuplicateDraw` if `existing_record` is present, whatever the pool holds
    /// - `EmptyPool` if there is nothing active to draw from
    /// - `InvalidWeight` / `StoreMismatch` on corrupted pool data
    pub fn draw(
        &mut self,
        store_id: StoreId,
        user_id: UserId,
        pool: &[CharacterPoolEntry],
        existing_record: Option<&InventoryRecord>,
    ) -> DrawErrorResult<DrawResult> {
        if existing_record.is_some() {
            return Err(DrawError::DuplicateDraw { user_id, store_id });
        }
        if pool.is_empty() {
            return Err(DrawError::EmptyPool { store_id });
        }
        validation::validate_pool(store_id, pool)?;

        let mut pool_snapshot: Vec<PoolSnapshotEntry> = pool
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| PoolSnapshotEntry {
                character_id: entry.character_id,
                weight: entry.weight,
            })
            .collect();
        // stable: duplicate character rows keep their input order
        pool_snapshot.sort_by_key(|entry| entry.character_id);

        let (character_id, roll, total_weight) = select_weighted(&mut self.rng, &pool_snapshot)
            .ok_or(DrawError::EmptyPool { store_id })?;

        let draw_id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();

        Ok(DrawResult {
            draw_id,
            store_id,
            user_id,
            character_id,
            pool_snapshot,
            roll,
            total_weight,
        })
    }
}

/// Cumulative-weight walk over `entries` in the order given.
///
/// Returns `(winner, roll, total_weight)`, or `None` when the entries carry
/// no probability mass. Non-positive weights contribute nothing.
pub fn select_weighted<R: Rng + ?Sized>(
    rng: &mut R,
    entries: &[PoolSnapshotEntry],
) -> Option<(CharacterId, u64, u64)> {
    let mass = |entry: &PoolSnapshotEntry| entry.weight.max(0) as u64;

    let total_weight: u64 = entries.iter().map(mass).sum();
    if total_weight == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total_weight);
    let mut cumulative = 0u64;
    for entry in entries {
        cumulative += mass(entry);
        if cumulative > roll {
            return Some((entry.character_id, roll, total_weight));
        }
    }

    None
}

/// Build the inventory record to persist for a successful draw.
///
/// Persistence and the uniqueness guarantee belong to the inventory store.
/// `user_id` and `store_id` must be the pair the draw was run for.
pub fn commit(
    draw_result: &DrawResult,
    user_id: UserId,
    store_id: StoreId,
    now: DateTime<Utc>,
) -> InventoryRecord {
    debug_assert_eq!(draw_result.user_id, user_id, "commit for a user the draw was not run for");
    debug_assert_eq!(draw_result.store_id, store_id, "commit for a store the draw was not run for");

    InventoryRecord {
        user_id,
        store_id,
        character_id: draw_result.character_id,
        awarded_at: now,
    }
}
