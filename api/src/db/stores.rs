//! 매장 / 매장 카테고리 쿼리

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::{Database, Store, StoreCategory};
use crate::types::PageRequest;

/// 매장 생성 입력
#[derive(Debug, Clone)]
pub struct NewStore {
    pub title: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub business_day: i16,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub pre_order_start_at: Option<DateTime<Utc>>,
    pub status: String,
    pub category_ids: Vec<i64>,
}

/// 매장 부분 수정 입력 (None이면 유지)
#[derive(Debug, Clone, Default)]
pub struct StorePatch {
    pub title: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub business_day: Option<i16>,
    pub start_date: Option<NaiveDate>,
    /// Some(None)이면 종료일 해제
    pub end_date: Option<Option<NaiveDate>>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub pre_order_start_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    /// Some이면 카테고리 전체 교체
    pub category_ids: Option<Vec<i64>>,
}

/// 매장 목록 필터
#[derive(Debug, Clone, Default)]
pub struct StoreQuery {
    pub title_contains: Option<String>,
    pub address_contains: Option<String>,
    pub category_id: Option<i64>,
    /// business_day & mask != 0
    pub business_day_mask: Option<i16>,
    /// start_date <= d AND (end_date IS NULL OR end_date >= d)
    pub open_on: Option<NaiveDate>,
}

const STORE_SELECT: &str = r#"
    SELECT
        s.id,
        s.title,
        s.address,
        s.latitude::float8 AS latitude,
        s.longitude::float8 AS longitude,
        s.description,
        s.business_day,
        s.start_date,
        s.end_date,
        s.opening_time,
        s.closing_time,
        s.pre_order_start_at,
        s.status,
        ARRAY(
            SELECT sc.store_category_id
            FROM store_store_categories sc
            WHERE sc.store_id = s.id
            ORDER BY sc.store_category_id
        ) AS category_ids,
        s.created_at,
        s.updated_at
    FROM stores s
"#;

const STORE_FILTER: &str = r#"
    WHERE s.status = 'ACTIVE'
      AND ($1::text IS NULL OR s.title ILIKE '%' || $1 || '%')
      AND ($2::text IS NULL OR s.address ILIKE '%' || $2 || '%')
      AND ($3::bigint IS NULL OR EXISTS (
            SELECT 1 FROM store_store_categories sc
            WHERE sc.store_id = s.id AND sc.store_category_id = $3
          ))
      AND ($4::smallint IS NULL OR (s.business_day & $4) <> 0)
      AND ($5::date IS NULL OR (s.start_date <= $5 AND (s.end_date IS NULL OR s.end_date >= $5)))
"#;

/// ILIKE 패턴 문자 이스케이프
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    /// 활성 매장 목록 (최신순)
    pub async fn list_stores(
        &self,
        query: &StoreQuery,
        page: PageRequest,
    ) -> Result<(Vec<Store>, i64)> {
        let title = query.title_contains.as_deref().map(escape_like);
        let address = query.address_contains.as_deref().map(escape_like);

        let sql = format!("{STORE_SELECT} {STORE_FILTER} ORDER BY s.id DESC LIMIT $6 OFFSET $7");
        let stores = sqlx::query_as::<_, Store>(&sql)
            .bind(&title)
            .bind(&address)
            .bind(query.category_id)
            .bind(query.business_day_mask)
            .bind(query.open_on)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM stores s {STORE_FILTER}");
        let count: (i64,) = sqlx::query_as(&count_sql)
            .bind(&title)
            .bind(&address)
            .bind(query.category_id)
            .bind(query.business_day_mask)
            .bind(query.open_on)
            .fetch_one(&self.pool)
            .await?;

        Ok((stores, count.0))
    }

    /// 활성 매장 단건 조회
    pub async fn get_store(&self, store_id: i64) -> Result<Option<Store>> {
        let sql = format!("{STORE_SELECT} WHERE s.id = $1 AND s.status = 'ACTIVE'");
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(store)
    }

    /// 삭제되지 않은 매장인지 (비활성 매장 포함, 관리용)
    pub async fn store_exists(&self, store_id: i64) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM stores WHERE id = $1 AND status <> 'DELETED')"
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 매장 생성 (카테고리 연결 포함, 트랜잭션)
    ///
    /// 상태와 무관하게 생성된 row를 그대로 반환
    pub async fn create_store(&self, store: &NewStore) -> Result<Store> {
        let mut tx = self.pool.begin().await?;

        let (store_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO stores (
                title, address, latitude, longitude, description, business_day,
                start_date, end_date, opening_time, closing_time, pre_order_start_at, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#
        )
        .bind(&store.title)
        .bind(&store.address)
        .bind(store.latitude)
        .bind(store.longitude)
        .bind(&store.description)
        .bind(store.business_day)
        .bind(store.start_date)
        .bind(store.end_date)
        .bind(store.opening_time)
        .bind(store.closing_time)
        .bind(store.pre_order_start_at)
        .bind(&store.status)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO store_store_categories (store_id, store_category_id)
            SELECT $1, c.id FROM store_categories c WHERE c.id = ANY($2)
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(store_id)
        .bind(&store.category_ids)
        .execute(&mut *tx)
        .await?;

        let sql = format!("{STORE_SELECT} WHERE s.id = $1");
        let created = sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// 삭제되지 않은 매장의 운영 기간 (start_date, end_date)
    pub async fn get_store_period(
        &self,
        store_id: i64,
    ) -> Result<Option<(NaiveDate, Option<NaiveDate>)>> {
        let period = sqlx::query_as::<_, (NaiveDate, Option<NaiveDate>)>(
            "SELECT start_date, end_date FROM stores WHERE id = $1 AND status <> 'DELETED'"
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(period)
    }

    /// 매장 부분 수정. 없거나 삭제된 매장이면 false
    pub async fn update_store(&self, store_id: i64, patch: &StorePatch) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE stores SET
                title = COALESCE($2, title),
                address = COALESCE($3, address),
                latitude = COALESCE($4, latitude),
                longitude = COALESCE($5, longitude),
                description = COALESCE($6, description),
                business_day = COALESCE($7, business_day),
                start_date = COALESCE($8, start_date),
                end_date = CASE WHEN $14 THEN $9 ELSE end_date END,
                opening_time = COALESCE($10, opening_time),
                closing_time = COALESCE($11, closing_time),
                pre_order_start_at = COALESCE($12, pre_order_start_at),
                status = COALESCE($13, status),
                updated_at = NOW()
            WHERE id = $1 AND status <> 'DELETED'
            "#
        )
        .bind(store_id)
        .bind(&patch.title)
        .bind(&patch.address)
        .bind(patch.latitude)
        .bind(patch.longitude)
        .bind(&patch.description)
        .bind(patch.business_day)
        .bind(patch.start_date)
        .bind(patch.end_date.flatten())
        .bind(patch.opening_time)
        .bind(patch.closing_time)
        .bind(patch.pre_order_start_at)
        .bind(&patch.status)
        .bind(patch.end_date.is_some())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(category_ids) = &patch.category_ids {
            sqlx::query("DELETE FROM store_store_categories WHERE store_id = $1")
                .bind(store_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO store_store_categories (store_id, store_category_id)
                SELECT $1, c.id FROM store_categories c WHERE c.id = ANY($2)
                ON CONFLICT DO NOTHING
                "#
            )
            .bind(store_id)
            .bind(category_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// 매장 삭제: status = DELETED (풀/인벤토리 이력 보존)
    pub async fn delete_store(&self, store_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE stores SET status = 'DELETED', updated_at = NOW() WHERE id = $1 AND status <> 'DELETED'"
        )
        .bind(store_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 매장 카테고리 목록 (priority 순)
    pub async fn list_store_categories(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<StoreCategory>, i64)> {
        let categories = sqlx::query_as::<_, StoreCategory>(
            r#"
            SELECT id, name, priority, created_at, updated_at
            FROM store_categories
            WHERE status = 'ACTIVE'
            ORDER BY priority, id
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM store_categories WHERE status = 'ACTIVE'")
                .fetch_one(&self.pool)
                .await?;

        Ok((categories, count.0))
    }

    pub async fn get_store_category(&self, category_id: i64) -> Result<Option<StoreCategory>> {
        let category = sqlx::query_as::<_, StoreCategory>(
            r#"
            SELECT id, name, priority, created_at, updated_at
            FROM store_categories
            WHERE id = $1 AND status = 'ACTIVE'
            "#
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("coffee"), "coffee");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
