//! 캐릭터 / 매장 캐릭터 풀 쿼리

use anyhow::Result;

use super::{Character, Database, PoolEntry};
use crate::types::PageRequest;

const POOL_SELECT: &str = r#"
    SELECT
        p.id,
        p.store_id,
        p.character_id,
        c.name AS character_name,
        p.weight,
        p.status,
        p.created_at,
        p.updated_at
    FROM store_character_pools p
    JOIN characters c ON c.id = p.character_id
"#;

impl Database {
    /// 활성 캐릭터 목록 (최신순)
    pub async fn list_characters(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Character>, i64)> {
        let name = name_contains.map(super::stores::escape_like);

        let characters = sqlx::query_as::<_, Character>(
            r#"
            SELECT id, name, description, profile_img_url, created_at, updated_at
            FROM characters
            WHERE status = 'ACTIVE' AND deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(&name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM characters
            WHERE status = 'ACTIVE' AND deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
            "#
        )
        .bind(&name)
        .fetch_one(&self.pool)
        .await?;

        Ok((characters, count.0))
    }

    pub async fn get_character(&self, character_id: i64) -> Result<Option<Character>> {
        let character = sqlx::query_as::<_, Character>(
            r#"
            SELECT id, name, description, profile_img_url, created_at, updated_at
            FROM characters
            WHERE id = $1 AND status = 'ACTIVE' AND deleted_at IS NULL
            "#
        )
        .bind(character_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(character)
    }

    /// 매장의 활성 풀 항목 (character_id 순). 뽑기 대상과 같은 조건
    pub async fn list_pool_entries(&self, store_id: i64) -> Result<Vec<PoolEntry>> {
        let sql = format!(
            r#"{POOL_SELECT}
            WHERE p.store_id = $1
              AND p.status = 'ACTIVE'
              AND c.status = 'ACTIVE'
              AND c.deleted_at IS NULL
            ORDER BY p.character_id, p.id"#
        );
        let entries = sqlx::query_as::<_, PoolEntry>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    /// 풀 항목 추가. 가중치 검증은 호출 전에 끝나 있어야 함 (DB CHECK도 있음)
    pub async fn insert_pool_entry(
        &self,
        store_id: i64,
        character_id: i64,
        weight: i32,
    ) -> Result<PoolEntry> {
        let (entry_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO store_character_pools (store_id, character_id, weight, status)
            VALUES ($1, $2, $3, 'ACTIVE')
            RETURNING id
            "#
        )
        .bind(store_id)
        .bind(character_id)
        .bind(weight)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!("{POOL_SELECT} WHERE p.id = $1");
        let entry = sqlx::query_as::<_, PoolEntry>(&sql)
            .bind(entry_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(entry)
    }

    /// 풀 항목 비활성화 (삭제하지 않음: 인벤토리 이력과의 참조 유지)
    pub async fn deactivate_pool_entry(&self, store_id: i64, entry_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE store_character_pools
            SET status = 'INACTIVE', updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND status = 'ACTIVE'
            "#
        )
        .bind(entry_id)
        .bind(store_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
