//! 회원 / 세션 / 인벤토리 쿼리

use anyhow::Result;
use chrono::NaiveDate;

use super::{Database, InventoryItem, Session, User};
use crate::types::PageRequest;

/// 회원 생성 입력
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: String,
    pub birthday: NaiveDate,
}

/// 회원 부분 수정 입력 (None이면 유지)
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
}

const USER_COLUMNS: &str =
    "id, name, email, phone, gender, birthday, status, created_at, updated_at";

impl Database {
    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (name, email, phone, gender, birthday, status)
            VALUES ($1, lower($2), $3, $4, $5, 'ACTIVE')
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.gender)
            .bind(user.birthday)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// 활성 회원 조회
    pub async fn get_active_user(&self, user_id: i64) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND status = 'ACTIVE' AND deleted_at IS NULL"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// 이메일 중복 확인 (탈퇴 회원 제외)
    pub async fn email_in_use(&self, email: &str) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = lower($1) AND deleted_at IS NULL)"
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn update_user(&self, user_id: i64, patch: &UserPatch) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                gender = COALESCE($4, gender),
                birthday = COALESCE($5, birthday),
                updated_at = NOW()
            WHERE id = $1 AND status = 'ACTIVE' AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(&patch.name)
            .bind(&patch.phone)
            .bind(&patch.gender)
            .bind(patch.birthday)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// 회원 탈퇴: soft delete + 세션 만료
    pub async fn withdraw_user(&self, user_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = 'WITHDRAWN', deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE user_access_tokens SET deleted_at = NOW(), updated_at = NOW() WHERE user_id = $1 AND deleted_at IS NULL"
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// 액세스 토큰으로 세션 조회
    pub async fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT t.user_id, t.device_id, t.expire_at, u.status AS user_status
            FROM user_access_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token = $1 AND t.deleted_at IS NULL
            "#
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// 내 캐릭터 인벤토리 (최신순)
    pub async fn get_inventory(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<(Vec<InventoryItem>, i64)> {
        let items = sqlx::query_as::<_, InventoryItem>(
            r#"
            SELECT
                i.id,
                i.user_id,
                i.store_id,
                s.title AS store_title,
                i.character_id,
                c.name AS character_name,
                c.profile_img_url,
                i.created_at
            FROM user_character_inventories i
            JOIN characters c ON c.id = i.character_id
            JOIN stores s ON s.id = i.store_id
            WHERE i.user_id = $1 AND i.deleted_at IS NULL
            ORDER BY i.created_at DESC, i.id DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_character_inventories WHERE user_id = $1 AND deleted_at IS NULL"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, count.0))
    }
}
