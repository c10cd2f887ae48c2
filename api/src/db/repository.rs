//! Draw Collaborator Contracts
//!
//! 뽑기 서비스가 의존하는 저장소 인터페이스
//!
//! - `PoolRepository`: 매장의 활성 캐릭터 풀 조회
//! - `InventoryStore`: 유저-매장 인벤토리 조회 / 원자적 INSERT
//! - `DrawLogStore`: 뽑기 감사 로그
//!
//! PostgreSQL 구현은 `Database`, 테스트용 in-memory 구현은 `mock` 모듈.
//!
//! # Concurrency
//!
//! 같은 (user, store)에 대한 동시 뽑기는 `insert_if_absent`에서 걸러짐.
//! `(user_id, store_id) WHERE deleted_at IS NULL` 부분 유니크 인덱스가
//! 중복 방지의 유일한 기준이고, 서비스의 사전 조회는 빠른 경로일 뿐.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moree_draw::{
    CharacterId, CharacterPoolEntry, DrawResult, InventoryRecord, StoreId, UserId,
};

use super::Database;

/// INSERT 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// 이미 같은 (user, store) 레코드가 존재 (동시 요청 경합 포함)
    AlreadyPresent,
}

#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// 활성 항목만 반환, 없으면 빈 Vec
    async fn get_active_pool(&self, store_id: StoreId) -> Result<Vec<CharacterPoolEntry>>;
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn get_record(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<InventoryRecord>>;

    async fn insert_if_absent(&self, record: &InventoryRecord) -> Result<InsertOutcome>;
}

#[async_trait]
pub trait DrawLogStore: Send + Sync {
    async fn log_draw(&self, result: &DrawResult) -> Result<()>;
}

// ============ PostgreSQL 구현 ============

#[async_trait]
impl PoolRepository for Database {
    async fn get_active_pool(&self, store_id: StoreId) -> Result<Vec<CharacterPoolEntry>> {
        let rows: Vec<(i64, i64, i32)> = sqlx::query_as(
            r#"
            SELECT p.store_id, p.character_id, p.weight
            FROM store_character_pools p
            JOIN characters c ON c.id = p.character_id
            WHERE p.store_id = $1
              AND p.status = 'ACTIVE'
              AND c.status = 'ACTIVE'
              AND c.deleted_at IS NULL
            ORDER BY p.character_id, p.id
            "#
        )
        .bind(store_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(store_id, character_id, weight)| {
                CharacterPoolEntry::new(StoreId(store_id), CharacterId(character_id), weight)
            })
            .collect())
    }
}

#[async_trait]
impl InventoryStore for Database {
    async fn get_record(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<InventoryRecord>> {
        let row: Option<(i64, i64, i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT user_id, store_id, character_id, created_at
            FROM user_character_inventories
            WHERE user_id = $1 AND store_id = $2 AND deleted_at IS NULL
            "#
        )
        .bind(user_id.0)
        .bind(store_id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id, store_id, character_id, awarded_at)| InventoryRecord {
            user_id: UserId(user_id),
            store_id: StoreId(store_id),
            character_id: CharacterId(character_id),
            awarded_at,
        }))
    }

    async fn insert_if_absent(&self, record: &InventoryRecord) -> Result<InsertOutcome> {
        // 부분 유니크 인덱스와 충돌하면 아무 row도 반환되지 않음
        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO user_character_inventories (
                user_id, character_id, store_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (user_id, store_id) WHERE deleted_at IS NULL
            DO NOTHING
            RETURNING id
            "#
        )
        .bind(record.user_id.0)
        .bind(record.character_id.0)
        .bind(record.store_id.0)
        .bind(record.awarded_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(_) => InsertOutcome::Inserted,
            None => InsertOutcome::AlreadyPresent,
        })
    }
}

#[async_trait]
impl DrawLogStore for Database {
    async fn log_draw(&self, result: &DrawResult) -> Result<()> {
        let snapshot = serde_json::to_string(&result.pool_snapshot)?;

        sqlx::query(
            r#"
            INSERT INTO draw_logs (
                draw_id, user_id, store_id, character_id, roll, total_weight, pool_snapshot, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#
        )
        .bind(result.draw_id)
        .bind(result.user_id.0)
        .bind(result.store_id.0)
        .bind(result.character_id.0)
        .bind(result.roll as i64)
        .bind(result.total_weight as i64)
        .bind(snapshot)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// 테스트용 Mock 구현:

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    pub struct MockPoolRepository {
        pools: RwLock<HashMap<StoreId, Vec<CharacterPoolEntry>>>,
    }

    impl MockPoolRepository {
        pub fn new() -> Self {
            Self {
                pools: RwLock::new(HashMap::new()),
            }
        }

        pub fn with_pool(self, store_id: StoreId, entries: Vec<CharacterPoolEntry>) -> Self {
            self.pools.write().unwrap().insert(store_id, entries);
            self
        }
    }

    #[async_trait]
    impl PoolRepository for MockPoolRepository {
        async fn get_active_pool(&self, store_id: StoreId) -> Result<Vec<CharacterPoolEntry>> {
            let pools = self.pools.read().unwrap();
            Ok(pools
                .get(&store_id)
                .map(|entries| entries.iter().filter(|e| e.active).cloned().collect())
                .unwrap_or_default())
        }
    }

    /// `hide_existing`이면 사전 조회는 항상 None → 동시 요청 경합 재현
    pub struct MockInventoryStore {
        records: RwLock<HashMap<(UserId, StoreId), InventoryRecord>>,
        hide_existing: bool,
    }

    impl MockInventoryStore {
        pub fn new() -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
                hide_existing: false,
            }
        }

        pub fn racing() -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
                hide_existing: true,
            }
        }

        pub fn seed(&self, record: InventoryRecord) {
            self.records
                .write()
                .unwrap()
                .insert((record.user_id, record.store_id), record);
        }

        pub fn len(&self) -> usize {
            self.records.read().unwrap().len()
        }
    }

    #[async_trait]
    impl InventoryStore for MockInventoryStore {
        async fn get_record(
            &self,
            user_id: UserId,
            store_id: StoreId,
        ) -> Result<Option<InventoryRecord>> {
            if self.hide_existing {
                return Ok(None);
            }
            Ok(self.records.read().unwrap().get(&(user_id, store_id)).cloned())
        }

        async fn insert_if_absent(&self, record: &InventoryRecord) -> Result<InsertOutcome> {
            let mut records = self.records.write().unwrap();
            let key = (record.user_id, record.store_id);
            if records.contains_key(&key) {
                return Ok(InsertOutcome::AlreadyPresent);
            }
            records.insert(key, record.clone());
            Ok(InsertOutcome::Inserted)
        }
    }

    pub struct MockDrawLogStore {
        logs: RwLock<Vec<DrawResult>>,
        fail: bool,
    }

    impl MockDrawLogStore {
        pub fn new() -> Self {
            Self {
                logs: RwLock::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                logs: RwLock::new(Vec::new()),
                fail: true,
            }
        }

        pub fn logs(&self) -> Vec<DrawResult> {
            self.logs.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl DrawLogStore for MockDrawLogStore {
        async fn log_draw(&self, result: &DrawResult) -> Result<()> {
            if self.fail {
                anyhow::bail!("draw log unavailable");
            }
            self.logs.write().unwrap().push(result.clone());
            Ok(())
        }
    }
}
