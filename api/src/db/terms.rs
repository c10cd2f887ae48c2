//! 약관 / 약관 동의 쿼리

use anyhow::Result;

use super::{Database, Term, TermAgreement, TermCategory};
use crate::types::PageRequest;

const TERM_SELECT: &str = r#"
    SELECT
        id, term_category_id, agreement_type, name, content, version, hash,
        priority, created_at, updated_at
    FROM terms
"#;

impl Database {
    /// 활성 약관 목록 (priority 순)
    pub async fn list_terms(
        &self,
        term_category_id: Option<i64>,
        page: PageRequest,
    ) -> Result<(Vec<Term>, i64)> {
        let sql = format!(
            r#"{TERM_SELECT}
            WHERE status = 'ACTIVE' AND deleted_at IS NULL
              AND ($1::bigint IS NULL OR term_category_id = $1)
            ORDER BY priority, id
            LIMIT $2 OFFSET $3"#
        );
        let terms = sqlx::query_as::<_, Term>(&sql)
            .bind(term_category_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM terms
            WHERE status = 'ACTIVE' AND deleted_at IS NULL
              AND ($1::bigint IS NULL OR term_category_id = $1)
            "#
        )
        .bind(term_category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((terms, count.0))
    }

    pub async fn get_term(&self, term_id: i64) -> Result<Option<Term>> {
        let sql =
            format!("{TERM_SELECT} WHERE id = $1 AND status = 'ACTIVE' AND deleted_at IS NULL");
        let term = sqlx::query_as::<_, Term>(&sql)
            .bind(term_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(term)
    }

    /// 비어 있는 hash 채우기 (이미 있으면 덮어쓰지 않음)
    pub async fn backfill_term_hash(&self, term_id: i64, hash: &str) -> Result<()> {
        sqlx::query("UPDATE terms SET hash = $2 WHERE id = $1 AND hash IS NULL")
            .bind(term_id)
            .bind(hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_term_categories(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<TermCategory>, i64)> {
        let categories = sqlx::query_as::<_, TermCategory>(
            r#"
            SELECT id, name, created_at
            FROM term_categories
            WHERE status = 'ACTIVE' AND deleted_at IS NULL
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM term_categories WHERE status = 'ACTIVE' AND deleted_at IS NULL"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok((categories, count.0))
    }

    /// 약관 동의 기록 (upsert)
    pub async fn upsert_term_agreement(
        &self,
        term_id: i64,
        user_id: i64,
        is_agreed: bool,
    ) -> Result<TermAgreement> {
        let agreement = sqlx::query_as::<_, TermAgreement>(
            r#"
            INSERT INTO user_term_agreements (term_id, user_id, is_agreed)
            VALUES ($1, $2, $3)
            ON CONFLICT (term_id, user_id)
            DO UPDATE SET
                is_agreed = EXCLUDED.is_agreed,
                deleted_at = NULL,
                updated_at = NOW()
            RETURNING id, term_id, user_id, is_agreed, updated_at
            "#
        )
        .bind(term_id)
        .bind(user_id)
        .bind(is_agreed)
        .fetch_one(&self.pool)
        .await?;

        Ok(agreement)
    }
}
