//! 매장 리뷰 / 리뷰 신고 쿼리

use anyhow::Result;

use super::{Database, Review};
use crate::types::PageRequest;

const REVIEW_SELECT: &str = r#"
    SELECT
        r.id,
        r.user_id,
        u.name AS user_name,
        r.store_id,
        r.content,
        r.rating::float8 AS rating,
        r.created_at
    FROM user_reviews r
    JOIN users u ON u.id = r.user_id
"#;

impl Database {
    /// 매장 리뷰 목록 (최신순)
    pub async fn list_reviews(
        &self,
        store_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Review>, i64)> {
        let sql = format!(
            "{REVIEW_SELECT} WHERE r.store_id = $1 AND r.deleted_at IS NULL ORDER BY r.created_at DESC, r.id DESC LIMIT $2 OFFSET $3"
        );
        let reviews = sqlx::query_as::<_, Review>(&sql)
            .bind(store_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_reviews WHERE store_id = $1 AND deleted_at IS NULL"
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((reviews, count.0))
    }

    pub async fn create_review(
        &self,
        user_id: i64,
        store_id: i64,
        content: &str,
        rating: f64,
    ) -> Result<Review> {
        let (review_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO user_reviews (user_id, store_id, content, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#
        )
        .bind(user_id)
        .bind(store_id)
        .bind(content)
        .bind(rating)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!("{REVIEW_SELECT} WHERE r.id = $1");
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(review)
    }

    pub async fn review_exists(&self, review_id: i64) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM user_reviews WHERE id = $1 AND deleted_at IS NULL)"
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// 리뷰 신고 저장, 신고 id 반환
    pub async fn report_review(&self, review_id: i64, user_id: i64, reason: &str) -> Result<i64> {
        let (report_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO user_review_reports (user_review_id, user_id, reason)
            VALUES ($1, $2, $3)
            RETURNING id
            "#
        )
        .bind(review_id)
        .bind(user_id)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;

        Ok(report_id)
    }
}
