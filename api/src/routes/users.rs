//! User Endpoints
//!
//! 회원 가입, 내 정보 조회/수정/탈퇴, 내 캐릭터 인벤토리

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_enum, require_text, PageQuery};
use crate::auth::AuthUser;
use crate::db::{InventoryItem, NewUser, User, UserPatch};
use crate::error::ApiError;
use crate::types::{Gender, Paginated};
use crate::AppState;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// MALE | FEMALE
    pub gender: String,
    pub birthday: NaiveDate,
}

/// None인 필드는 변경하지 않음
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: String,
    pub birthday: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            gender: user.gender,
            birthday: user.birthday,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

/// 인벤토리 항목
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub id: i64,
    pub store_id: i64,
    pub store_title: String,
    pub character_id: i64,
    pub character_name: String,
    pub profile_img_url: Option<String>,
    pub obtained_at: DateTime<Utc>,
}

impl From<InventoryItem> for InventoryResponse {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: item.id,
            store_id: item.store_id,
            store_title: item.store_title,
            character_id: item.character_id,
            character_name: item.character_name,
            profile_img_url: item.profile_img_url,
            obtained_at: item.created_at,
        }
    }
}

// ============ Handlers ============

/// POST /users
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    require_text("name", &req.name, 255)?;
    validate_email(&req.email)?;
    let gender: Gender = parse_enum(&req.gender)?;
    validate_birthday(req.birthday)?;

    if state.db.email_in_use(req.email.trim()).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let user = state
        .db
        .create_user(&NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.filter(|p| !p.trim().is_empty()),
            gender: gender.as_str().to_string(),
            birthday: req.birthday,
        })
        .await?;

    tracing::info!(user_id = user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .get_active_user(auth.user_id.0)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(Json(user.into()))
}

/// PATCH /users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(name) = &req.name {
        require_text("name", name, 255)?;
    }
    let gender = req
        .gender
        .as_deref()
        .map(parse_enum::<Gender>)
        .transpose()?;
    if let Some(birthday) = req.birthday {
        validate_birthday(birthday)?;
    }

    let patch = UserPatch {
        name: req.name.map(|n| n.trim().to_string()),
        phone: req.phone,
        gender: gender.map(|g| g.as_str().to_string()),
        birthday: req.birthday,
    };

    let user = state
        .db
        .update_user(auth.user_id.0, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(Json(user.into()))
}

/// DELETE /users/me
///
/// 탈퇴: status WITHDRAWN + soft delete, 발급된 세션도 모두 만료
pub async fn withdraw_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, ApiError> {
    if !state.db.withdraw_user(auth.user_id.0).await? {
        return Err(ApiError::NotFound("User".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, "User withdrew");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me/inventory
pub async fn get_my_inventory(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<InventoryResponse>>, ApiError> {
    let page = query.resolve(&state);
    let (items, total) = state.db.get_inventory(auth.user_id.0, page).await?;

    Ok(Json(Paginated::new(
        items.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

// ============ Validation ============

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
            }
            None => false,
        };
    if !valid {
        return Err(ApiError::ValidationError("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_birthday(birthday: NaiveDate) -> Result<(), ApiError> {
    if birthday > Utc::now().date_naive() {
        return Err(ApiError::ValidationError("birthday must not be in the future".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@moree.kr").is_ok());
        assert!(validate_email(" user@moree.kr ").is_ok());
        assert!(validate_email("user").is_err());
        assert!(validate_email("@moree.kr").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_validate_birthday() {
        assert!(validate_birthday(NaiveDate::from_ymd_opt(1995, 3, 1).unwrap()).is_ok());
        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        assert!(validate_birthday(tomorrow).is_err());
    }
}
