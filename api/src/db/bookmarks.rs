//! 매장 북마크 폴더 쿼리

use anyhow::Result;

use super::{Bookmark, Database};
use crate::types::PageRequest;

const BOOKMARK_SELECT: &str = r#"
    SELECT
        b.id,
        b.user_id,
        b.title,
        b.description,
        b.visibility,
        ARRAY(
            SELECT bs.store_id
            FROM user_store_bookmark_stores bs
            WHERE bs.bookmark_id = b.id
            ORDER BY bs.store_id
        ) AS store_ids,
        b.created_at,
        b.updated_at
    FROM user_store_bookmarks b
"#;

impl Database {
    pub async fn list_bookmarks(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<Bookmark>, i64)> {
        let sql = format!(
            "{BOOKMARK_SELECT} WHERE b.user_id = $1 AND b.deleted_at IS NULL ORDER BY b.id DESC LIMIT $2 OFFSET $3"
        );
        let bookmarks = sqlx::query_as::<_, Bookmark>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_store_bookmarks WHERE user_id = $1 AND deleted_at IS NULL"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((bookmarks, count.0))
    }

    /// 북마크 폴더 생성. 활성 매장만 연결됨
    pub async fn create_bookmark(
        &self,
        user_id: i64,
        title: &str,
        description: &str,
        visibility: &str,
        store_ids: &[i64],
    ) -> Result<Bookmark> {
        let mut tx = self.pool.begin().await?;

        let (bookmark_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO user_store_bookmarks (user_id, title, description, visibility)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(visibility)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_store_bookmark_stores (bookmark_id, store_id)
            SELECT $1, s.id FROM stores s
            WHERE s.id = ANY($2) AND s.status = 'ACTIVE'
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(bookmark_id)
        .bind(store_ids)
        .execute(&mut *tx)
        .await?;

        let sql = format!("{BOOKMARK_SELECT} WHERE b.id = $1");
        let bookmark = sqlx::query_as::<_, Bookmark>(&sql)
            .bind(bookmark_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bookmark)
    }

    /// 본인 북마크만 soft delete
    pub async fn delete_bookmark(&self, user_id: i64, bookmark_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_store_bookmarks
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#
        )
        .bind(bookmark_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
