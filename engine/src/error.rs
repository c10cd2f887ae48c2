//! Error types for the draw engine
//!
//! Every failure is terminal for the call that raised it; nothing here is
//! retried.

use thiserror::Error;

use crate::model::{CharacterId, CharacterPoolEntry, StoreId, UserId};

/// Error types for draw operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    /// The store has no active entries to draw from
    #[error("Nothing available to draw at store {store_id}")]
    EmptyPool { store_id: StoreId },

    /// A pool entry carries a non-positive weight
    #[error("Invalid weight {weight} for character {character_id} at store {store_id}")]
    InvalidWeight {
        store_id: StoreId,
        character_id: CharacterId,
        weight: i32,
    },

    /// A pool entry belongs to another store than the one being drawn
    #[error("Pool entry for character {character_id} belongs to store {found}, expected {expected}")]
    StoreMismatch {
        expected: StoreId,
        found: StoreId,
        character_id: CharacterId,
    },

    /// The user already holds a character from this store
    #[error("User {user_id} has already drawn at store {store_id}")]
    DuplicateDraw { user_id: UserId, store_id: StoreId },
}

/// How a draw failure should be treated by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Normal business rejection, shown to the user as-is
    Business,
    /// Upstream data corruption; log loudly, answer with a generic error
    Integrity,
}

impl DrawError {
    pub fn severity(&self) -> Severity {
        match self {
            DrawError::EmptyPool { .. } | DrawError::DuplicateDraw { .. } => Severity::Business,
            DrawError::InvalidWeight { .. } | DrawError::StoreMismatch { .. } => {
                Severity::Integrity
            }
        }
    }
}

/// Result type for draw operations
pub type DrawErrorResult<T> = Result<T, DrawError>;

/// Pool admission checks
///
/// Store administrators go through these before a pool entry is persisted;
/// the engine runs the same checks again at draw time.
pub mod validation {
    use super::*;

    /// Weight must be strictly positive. Zero is rejected rather than treated
    /// as "never drawn" so misconfigured pools surface immediately.
    pub fn validate_weight(
        store_id: StoreId,
        character_id: CharacterId,
        weight: i32,
    ) -> DrawErrorResult<()> {
        if weight <= 0 {
            return Err(DrawError::InvalidWeight {
                store_id,
                character_id,
                weight,
            });
        }
        Ok(())
    }

    /// Validate a single entry at admission time
    pub fn validate_entry(entry: &CharacterPoolEntry) -> DrawErrorResult<()> {
        validate_weight(entry.store_id, entry.character_id, entry.weight)
    }

    /// Validate every supplied entry for a draw at `store_id`.
    ///
    /// Inactive entries are checked too: they are still part of the
    /// configured pool.
    pub fn validate_pool(store_id: StoreId, pool: &[CharacterPoolEntry]) -> DrawErrorResult<()> {
        for entry in pool {
            validate_entry(entry)?;
            if entry.store_id != store_id {
                return Err(DrawError::StoreMismatch {
                    expected: store_id,
                    found: entry.store_id,
                    character_id: entry.character_id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(StoreId(1), CharacterId(1), 1).is_ok());
        assert!(validate_weight(StoreId(1), CharacterId(1), i32::MAX).is_ok());
        assert!(validate_weight(StoreId(1), CharacterId(1), 0).is_err());
        assert!(validate_weight(StoreId(1), CharacterId(1), -5).is_err());
    }

    #[test]
    fn test_validate_pool_store_mismatch() {
        let pool = vec![
            CharacterPoolEntry::new(StoreId(1), CharacterId(1), 2),
            CharacterPoolEntry::new(StoreId(2), CharacterId(3), 2),
        ];

        let err = validate_pool(StoreId(1), &pool).unwrap_err();
        assert_eq!(
            err,
            DrawError::StoreMismatch {
                expected: StoreId(1),
                found: StoreId(2),
                character_id: CharacterId(3),
            }
        );
    }

    #[test]
    fn test_validate_pool_checks_inactive_entries() {
        let pool = vec![
            CharacterPoolEntry::new(StoreId(1), CharacterId(1), 2),
            CharacterPoolEntry::new(StoreId(1), CharacterId(2), 0).deactivated(),
        ];

        assert!(matches!(
            validate_pool(StoreId(1), &pool),
            Err(DrawError::InvalidWeight { weight: 0, .. })
        ));
    }

    #[test]
    fn test_severity() {
        assert_eq!(
            DrawError::EmptyPool { store_id: StoreId(1) }.severity(),
            Severity::Business
        );
        assert_eq!(
            DrawError::DuplicateDraw {
                user_id: UserId(1),
                store_id: StoreId(1)
            }
            .severity(),
            Severity::Business
        );
        assert_eq!(
            DrawError::InvalidWeight {
                store_id: StoreId(1),
                character_id: CharacterId(1),
                weight: 0
            }
            .severity(),
            Severity::Integrity
        );
    }

    #[test]
    fn test_error_messages() {
        let err = DrawError::DuplicateDraw {
            user_id: UserId(3),
            store_id: StoreId(9),
        };
        assert!(err.to_string().contains("already drawn"));

        let err = DrawError::EmptyPool { store_id: StoreId(9) };
        assert!(err.to_string().contains("Nothing available"));
    }
}
