//! Bookmark Endpoints
//!
//! 내 매장 북마크 폴더

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_enum, require_text, PageQuery};
use crate::auth::AuthUser;
use crate::db::Bookmark;
use crate::error::ApiError;
use crate::types::{BookmarkVisibility, Paginated};
use crate::AppState;

/// 폴더당 매장 수 상한
const MAX_STORES_PER_BOOKMARK: usize = 100;

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 생략하면 PRIVATE
    pub visibility: Option<String>,
    #[serde(default)]
    pub store_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub visibility: String,
    pub store_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bookmark> for BookmarkResponse {
    fn from(bookmark: Bookmark) -> Self {
        Self {
            id: bookmark.id,
            title: bookmark.title,
            description: bookmark.description,
            visibility: bookmark.visibility,
            store_ids: bookmark.store_ids,
            created_at: bookmark.created_at,
            updated_at: bookmark.updated_at,
        }
    }
}

/// GET /users/me/bookmarks
pub async fn list_bookmarks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<BookmarkResponse>>, ApiError> {
    let page = query.resolve(&state);
    let (bookmarks, total) = state.db.list_bookmarks(auth.user_id.0, page).await?;

    Ok(Json(Paginated::new(
        bookmarks.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

/// POST /users/me/bookmarks
///
/// 비활성/삭제된 매장 id는 조용히 제외됨
pub async fn create_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkResponse>), ApiError> {
    require_text("title", &req.title, 255)?;
    let visibility = match &req.visibility {
        Some(v) => parse_enum::<BookmarkVisibility>(v)?,
        None => BookmarkVisibility::Private,
    };
    if req.store_ids.len() > MAX_STORES_PER_BOOKMARK {
        return Err(ApiError::ValidationError(format!(
            "A bookmark can hold at most {} stores",
            MAX_STORES_PER_BOOKMARK
        )));
    }

    let bookmark = state
        .db
        .create_bookmark(
            auth.user_id.0,
            req.title.trim(),
            &req.description,
            visibility.as_str(),
            &req.store_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(bookmark.into())))
}

/// DELETE /users/me/bookmarks/:id
pub async fn delete_bookmark(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(bookmark_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_bookmark(auth.user_id.0, bookmark_id).await? {
        return Err(ApiError::NotFound("Bookmark".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
