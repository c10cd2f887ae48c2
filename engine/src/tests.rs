//! Statistical and scenario tests for the draw engine

#[cfg(test)]
mod integration_tests {
    use crate::draw::{commit, select_weighted, DrawEngine};
    use crate::error::DrawError;
    use crate::model::{CharacterId, CharacterPoolEntry, PoolSnapshotEntry, StoreId, UserId};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    const STORE: StoreId = StoreId(100);
    const USER: UserId = UserId(7);

    fn pool(entries: &[(i64, i32)]) -> Vec<CharacterPoolEntry> {
        entries
            .iter()
            .map(|&(id, weight)| CharacterPoolEntry::new(STORE, CharacterId(id), weight))
            .collect()
    }

    fn frequencies(
        engine: &mut DrawEngine,
        pool: &[CharacterPoolEntry],
        draws: usize,
    ) -> HashMap<CharacterId, u64> {
        let mut counts = HashMap::new();
        for _ in 0..draws {
            let result = engine.draw(STORE, USER, pool, None).unwrap();
            *counts.entry(result.character_id).or_insert(0u64) += 1;
        }
        counts
    }

    /// Pearson chi-squared statistic against the weights of `entries`
    fn chi_squared(
        counts: &HashMap<CharacterId, u64>,
        entries: &[(i64, i32)],
        draws: usize,
    ) -> f64 {
        let total: i64 = entries.iter().map(|&(_, w)| w as i64).sum();
        entries
            .iter()
            .map(|&(id, weight)| {
                let expected = draws as f64 * weight as f64 / total as f64;
                let observed = *counts.get(&CharacterId(id)).unwrap_or(&0) as f64;
                (observed - expected).powi(2) / expected
            })
            .sum()
    }

    // =============================================================
    // Distribution
    // =============================================================

    mod distribution_tests {
        use super::*;

        /// Critical value for 3 degrees of freedom at p = 0.0001
        const CHI2_DF3_CRITICAL: f64 = 21.108;

        #[test]
        fn test_frequencies_converge_to_weights() {
            let entries = [(1, 1), (2, 2), (3, 3), (4, 4)];
            let pool = pool(&entries);
            let draws = 100_000;

            let mut engine = DrawEngine::seeded(20240101);
            let counts = frequencies(&mut engine, &pool, draws);

            let chi2 = chi_squared(&counts, &entries, draws);
            assert!(chi2 < CHI2_DF3_CRITICAL, "chi-squared {} too large: {:?}", chi2, counts);
        }

        #[test]
        fn test_one_to_three_ratio() {
            let pool = pool(&[(1, 1), (2, 3)]);
            let draws = 400_000;

            let mut engine = DrawEngine::seeded(77);
            let counts = frequencies(&mut engine, &pool, draws);

            let a = counts[&CharacterId(1)] as i64;
            let b = counts[&CharacterId(2)] as i64;
            assert_eq!(a + b, draws as i64);
            // sd of either count is ~274; 2000 is over 7 sd
            assert!((a - 100_000).abs() < 2_000, "A drawn {} times", a);
            assert!((b - 300_000).abs() < 2_000, "B drawn {} times", b);
        }

        #[test]
        fn test_walk_order_does_not_change_distribution() {
            let entries = [(4, 4), (1, 1), (3, 3), (2, 2)];
            let shuffled: Vec<PoolSnapshotEntry> = entries
                .iter()
                .map(|&(id, weight)| PoolSnapshotEntry { character_id: CharacterId(id), weight })
                .collect();
            let draws = 100_000;

            let mut rng = StdRng::seed_from_u64(5);
            let mut counts = HashMap::new();
            for _ in 0..draws {
                let (winner, _, _) = select_weighted(&mut rng, &shuffled).unwrap();
                *counts.entry(winner).or_insert(0u64) += 1;
            }

            let chi2 = chi_squared(&counts, &entries, draws);
            assert!(chi2 < CHI2_DF3_CRITICAL, "chi-squared {} too large: {:?}", chi2, counts);
        }

        #[test]
        fn test_input_order_is_irrelevant_to_seeded_outcome() {
            let forward = pool(&[(1, 5), (2, 1), (3, 9)]);
            let mut reversed = forward.clone();
            reversed.reverse();

            let mut a = DrawEngine::seeded(11);
            let mut b = DrawEngine::seeded(11);
            for _ in 0..1_000 {
                let left = a.draw(STORE, USER, &forward, None).unwrap();
                let right = b.draw(STORE, USER, &reversed, None).unwrap();
                assert_eq!(left.character_id, right.character_id);
                assert_eq!(left.pool_snapshot, right.pool_snapshot);
            }
        }

        #[test]
        fn test_same_seed_same_sequence() {
            let pool = pool(&[(1, 1), (2, 1), (3, 1)]);
            let mut a = DrawEngine::seeded(1234);
            let mut b = DrawEngine::seeded(1234);

            for _ in 0..100 {
                let left = a.draw(STORE, USER, &pool, None).unwrap();
                let right = b.draw(STORE, USER, &pool, None).unwrap();
                assert_eq!(left, right);
            }
        }
    }

    // =============================================================
    // Error scenarios
    // =============================================================

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_empty_pool() {
            let mut engine = DrawEngine::seeded(1);
            assert_eq!(
                engine.draw(STORE, USER, &[], None),
                Err(DrawError::EmptyPool { store_id: STORE })
            );
        }

        #[test]
        fn test_zero_weight() {
            let mut engine = DrawEngine::seeded(1);
            assert_eq!(
                engine.draw(STORE, USER, &pool(&[(1, 0)]), None),
                Err(DrawError::InvalidWeight {
                    store_id: STORE,
                    character_id: CharacterId(1),
                    weight: 0,
                })
            );
        }

        #[test]
        fn test_negative_weight_among_valid_entries() {
            let mut engine = DrawEngine::seeded(1);
            let result = engine.draw(STORE, USER, &pool(&[(1, 10), (2, -1), (3, 4)]), None);
            assert!(matches!(result, Err(DrawError::InvalidWeight { weight: -1, .. })));
        }

        #[test]
        fn test_existing_record_rejected_regardless_of_pool() {
            let record = commit(
                &DrawEngine::seeded(1).draw(STORE, USER, &pool(&[(1, 1)]), None).unwrap(),
                USER,
                STORE,
                Utc::now(),
            );

            let expected = Err(DrawError::DuplicateDraw { user_id: USER, store_id: STORE });
            let mut engine = DrawEngine::seeded(2);
            assert_eq!(engine.draw(STORE, USER, &pool(&[(1, 1)]), Some(&record)), expected);
            assert_eq!(engine.draw(STORE, USER, &[], Some(&record)), expected);
            assert_eq!(engine.draw(STORE, USER, &pool(&[(1, 0)]), Some(&record)), expected);
        }

        #[test]
        fn test_draw_commit_then_second_draw_fails() {
            let pool = pool(&[(1, 2), (2, 8)]);
            let mut engine = DrawEngine::seeded(99);

            let first = engine.draw(STORE, USER, &pool, None).unwrap();
            let record = commit(&first, USER, STORE, Utc::now());
            assert_eq!(record.character_id, first.character_id);

            let second = engine.draw(STORE, USER, &pool, Some(&record));
            assert!(matches!(second, Err(DrawError::DuplicateDraw { .. })));
        }

        #[test]
        fn test_other_user_may_still_draw() {
            let pool = pool(&[(1, 1)]);
            let mut engine = DrawEngine::seeded(3);

            let first = engine.draw(STORE, USER, &pool, None).unwrap();
            let _record = commit(&first, USER, STORE, Utc::now());

            // the caller looks up records per (user, store); another user has none
            assert!(engine.draw(STORE, UserId(8), &pool, None).is_ok());
        }

        #[test]
        fn test_snapshot_serializes_for_audit() {
            let mut engine = DrawEngine::seeded(3);
            let result = engine.draw(STORE, USER, &pool(&[(2, 3), (1, 1)]), None).unwrap();

            let json = serde_json::to_value(&result.pool_snapshot).unwrap();
            assert_eq!(
                json,
                serde_json::json!([
                    { "character_id": 1, "weight": 1 },
                    { "character_id": 2, "weight": 3 }
                ])
            );
        }
    }
}
