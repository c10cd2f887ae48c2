//! Store Endpoints
//!
//! 매장 / 매장 카테고리 조회 및 관리
//!
//! # Filters (GET /stores)
//!
//! - `title_contains`, `address_contains`: 부분 일치 (대소문자 무시)
//! - `category_id`: 해당 카테고리에 속한 매장
//! - `business_day_mask`: `business_day & mask != 0`
//! - `open_on=YYYY-MM-DD`: 운영 기간 안이고 해당 요일에 영업

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{page_request, parse_enum, require_active_store, require_text, PageQuery};
use crate::auth::AuthUser;
use crate::db::{NewStore, Store, StoreCategory, StorePatch, StoreQuery};
use crate::error::ApiError;
use crate::types::{BusinessDays, Paginated, Status};
use crate::AppState;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct StoreListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub title_contains: Option<String>,
    pub address_contains: Option<String>,
    pub category_id: Option<i64>,
    pub business_day_mask: Option<i16>,
    pub open_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub title: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
    /// 생략하면 매일 영업
    pub business_day: Option<i16>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub pre_order_start_at: Option<DateTime<Utc>>,
    /// 생략하면 INACTIVE (풀 구성 후 활성화)
    pub status: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStoreRequest {
    pub title: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub business_day: Option<i16>,
    pub start_date: Option<NaiveDate>,
    /// 생략하면 유지, null이면 종료일 해제
    #[serde(default, deserialize_with = "super::nullable")]
    pub end_date: Option<Option<NaiveDate>>,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub pre_order_start_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub category_ids: Option<Vec<i64>>,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            title: store.title,
            address: store.address,
            latitude: store.latitude,
            longitude: store.longitude,
            description: store.description,
            business_day: store.business_day,
            start_date: store.start_date,
            end_date: store.end_date,
            opening_time: store.opening_time,
            closing_time: store.closing_time,
            pre_order_start_at: store.pre_order_start_at,
            status: store.status,
            category_ids: store.category_ids,
            created_at: store.created_at,
            updated_at: store.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreCategoryResponse {
    pub id: i64,
    pub name: String,
    pub priority: i16,
}

impl From<StoreCategory> for StoreCategoryResponse {
    fn from(category: StoreCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
            priority: category.priority,
        }
    }
}

// ============ Handlers ============

/// GET /stores
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Paginated<StoreResponse>>, ApiError> {
    let page = page_request(&state, query.page, query.page_size);

    if let Some(mask) = query.business_day_mask {
        BusinessDays::new(mask).map_err(ApiError::ValidationError)?;
    }

    let filter = StoreQuery {
        title_contains: non_empty(query.title_contains),
        address_contains: non_empty(query.address_contains),
        category_id: query.category_id,
        business_day_mask: BusinessDays::filter_mask(query.business_day_mask, query.open_on),
        open_on: query.open_on,
    };

    let (stores, total) = state.db.list_stores(&filter, page).await?;

    Ok(Json(Paginated::new(
        stores.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

/// GET /stores/:id
pub async fn get_store(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<StoreResponse>, ApiError> {
    let store = require_active_store(&state, store_id).await?;

    Ok(Json(store.into()))
}

/// POST /stores
pub async fn create_store(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>), ApiError> {
    require_text("title", &req.title, 255)?;
    require_text("address", &req.address, 255)?;
    validate_coordinates(req.latitude, req.longitude)?;
    validate_period(req.start_date, req.end_date)?;
    let business_day = match req.business_day {
        Some(mask) => BusinessDays::new(mask).map_err(ApiError::ValidationError)?,
        None => BusinessDays::ALL,
    };
    let status = match &req.status {
        Some(status) => parse_store_status(status)?,
        None => Status::Inactive,
    };

    let store = state
        .db
        .create_store(&NewStore {
            title: req.title.trim().to_string(),
            address: req.address.trim().to_string(),
            latitude: req.latitude,
            longitude: req.longitude,
            description: req.description,
            business_day: business_day.0,
            start_date: req.start_date,
            end_date: req.end_date,
            opening_time: req.opening_time,
            closing_time: req.closing_time,
            pre_order_start_at: req.pre_order_start_at,
            status: status.as_str().to_string(),
            category_ids: req.category_ids,
        })
        .await?;

    tracing::info!(store_id = store.id, user_id = %auth.user_id, "Store created");
    Ok((StatusCode::CREATED, Json(store.into())))
}

/// PATCH /stores/:id
pub async fn update_store(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(store_id): Path<i64>,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<StatusCode, ApiError> {
    if let Some(title) = &req.title {
        require_text("title", title, 255)?;
    }
    if let Some(address) = &req.address {
        require_text("address", address, 255)?;
    }
    if let (Some(lat), Some(lng)) = (req.latitude, req.longitude) {
        validate_coordinates(lat, lng)?;
    } else if req.latitude.is_some() || req.longitude.is_some() {
        return Err(ApiError::ValidationError(
            "latitude and longitude must be updated together".to_string(),
        ));
    }
    if let Some(mask) = req.business_day {
        BusinessDays::new(mask).map_err(ApiError::ValidationError)?;
    }
    let status = req
        .status
        .as_deref()
        .map(parse_store_status)
        .transpose()?;

    // 한쪽만 바뀌어도 저장된 값과 합친 기간으로 검증
    if req.start_date.is_some() || req.end_date.is_some() {
        let stored = state
            .db
            .get_store_period(store_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Store".to_string()))?;
        validate_patched_period(stored, req.start_date, req.end_date)?;
    }

    let patch = StorePatch {
        title: req.title.map(|t| t.trim().to_string()),
        address: req.address.map(|a| a.trim().to_string()),
        latitude: req.latitude,
        longitude: req.longitude,
        description: req.description,
        business_day: req.business_day,
        start_date: req.start_date,
        end_date: req.end_date,
        opening_time: req.opening_time,
        closing_time: req.closing_time,
        pre_order_start_at: req.pre_order_start_at,
        status: status.map(|s| s.as_str().to_string()),
        category_ids: req.category_ids,
    };

    if !state.db.update_store(store_id, &patch).await? {
        return Err(ApiError::NotFound("Store".to_string()));
    }

    tracing::info!(store_id, user_id = %auth.user_id, "Store updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /stores/:id
///
/// status만 DELETED로 변경. 풀/인벤토리 이력은 보존
pub async fn delete_store(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(store_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !state.db.delete_store(store_id).await? {
        return Err(ApiError::NotFound("Store".to_string()));
    }

    tracing::info!(store_id, user_id = %auth.user_id, "Store deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /store-categories
pub async fn list_store_categories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<StoreCategoryResponse>>, ApiError> {
    let page = query.resolve(&state);
    let (categories, total) = state.db.list_store_categories(page).await?;

    Ok(Json(Paginated::new(
        categories.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

/// GET /store-categories/:id
pub async fn get_store_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Json<StoreCategoryResponse>, ApiError> {
    let category = state
        .db
        .get_store_category(category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store category".to_string()))?;

    Ok(Json(category.into()))
}

// ============ Validation ============

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ApiError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::ValidationError("Invalid coordinates".to_string()));
    }
    Ok(())
}

fn validate_period(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), ApiError> {
    match end {
        Some(end) if end < start => Err(ApiError::ValidationError(
            "end_date must not be before start_date".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_patched_period(
    (stored_start, stored_end): (NaiveDate, Option<NaiveDate>),
    start: Option<NaiveDate>,
    end: Option<Option<NaiveDate>>,
) -> Result<(), ApiError> {
    validate_period(start.unwrap_or(stored_start), end.unwrap_or(stored_end))
}

/// 삭제는 DELETE 엔드포인트로만
fn parse_store_status(value: &str) -> Result<Status, ApiError> {
    match parse_enum::<Status>(value)? {
        Status::Deleted => Err(ApiError::ValidationError(
            "Use DELETE /stores/:id to delete a store".to_string(),
        )),
        status => Ok(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  성수 ".to_string())), Some("성수".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(37.5446, 127.0559).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
    }

    #[test]
    fn test_validate_period() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(validate_period(start, None).is_ok());
        assert!(validate_period(start, Some(start)).is_ok());
        assert!(validate_period(start, NaiveDate::from_ymd_opt(2024, 5, 31)).is_err());
    }

    #[test]
    fn test_end_date_only_patch_checked_against_stored_start() {
        let stored = (NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), None);
        let earlier = NaiveDate::from_ymd_opt(2000, 1, 1);

        assert!(validate_patched_period(stored, None, Some(earlier)).is_err());
        assert!(validate_patched_period(stored, None, Some(None)).is_ok());
        assert!(validate_patched_period(stored, earlier, Some(earlier)).is_ok());
    }

    #[test]
    fn test_start_date_only_patch_checked_against_stored_end() {
        let stored = (
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30),
        );

        let after_end = NaiveDate::from_ymd_opt(2024, 7, 1);
        let within = NaiveDate::from_ymd_opt(2024, 6, 15);

        assert!(validate_patched_period(stored, after_end, None).is_err());
        assert!(validate_patched_period(stored, within, None).is_ok());
        // 종료일을 함께 해제하면 허용
        assert!(validate_patched_period(stored, after_end, Some(None)).is_ok());
    }

    #[test]
    fn test_update_request_end_date_states() {
        let absent: UpdateStoreRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.end_date, None);

        let cleared: UpdateStoreRequest = serde_json::from_str(r#"{"end_date":null}"#).unwrap();
        assert_eq!(cleared.end_date, Some(None));

        let set: UpdateStoreRequest =
            serde_json::from_str(r#"{"end_date":"2024-07-01"}"#).unwrap();
        assert_eq!(set.end_date, Some(NaiveDate::from_ymd_opt(2024, 7, 1)));
    }

    #[test]
    fn test_parse_store_status() {
        assert_eq!(parse_store_status("active").unwrap(), Status::Active);
        assert!(parse_store_status("DELETED").is_err());
        assert!(parse_store_status("closed").is_err());
    }
}
