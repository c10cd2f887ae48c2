//! Database Models
//!
//! Row types for the loyalty schema. Enum-like columns stay `String` here
//! and are parsed at the route boundary.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// 회원
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// MALE | FEMALE
    pub gender: String,
    pub birthday: NaiveDate,
    /// ACTIVE | DORMANT | WITHDRAWN
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 액세스 토큰 세션 (users 조인)
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub user_id: i64,
    pub device_id: String,
    pub expire_at: DateTime<Utc>,
    pub user_status: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct StoreCategory {
    pub id: i64,
    pub name: String,
    pub priority: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 매장
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: i64,
    pub title: String,
    pub address: String,
    /// NUMERIC(10,7), float8로 캐스팅해서 조회
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    /// 요일 bitmask
    pub business_day: i16,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub pre_order_start_at: Option<DateTime<Utc>>,
    pub status: String,
    /// store_store_categories 집계
    pub category_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 수집 캐릭터
#[derive(Debug, Clone, FromRow)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub profile_img_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 매장 캐릭터 풀 항목
#[derive(Debug, Clone, FromRow)]
pub struct PoolEntry {
    pub id: i64,
    pub store_id: i64,
    pub character_id: i64,
    pub character_name: String,
    /// 뽑힐 가중치 (값이 클수록 잘 뽑힘)
    pub weight: i32,
    /// ACTIVE | INACTIVE
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 유저 캐릭터 인벤토리 (캐릭터 조인)
#[derive(Debug, Clone, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub store_title: String,
    pub character_id: i64,
    pub character_name: String,
    pub profile_img_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 매장 리뷰
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub store_id: i64,
    pub content: String,
    /// NUMERIC(3,2), float8로 캐스팅해서 조회
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// 북마크 폴더
#[derive(Debug, Clone, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub visibility: String,
    pub store_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TermCategory {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// 약관
#[derive(Debug, Clone, FromRow)]
pub struct Term {
    pub id: i64,
    pub term_category_id: i64,
    /// REQUIRED | OPTIONAL
    pub agreement_type: String,
    pub name: String,
    pub content: String,
    pub version: String,
    /// 비어 있으면 조회 시 계산해서 채움
    pub hash: Option<String>,
    pub priority: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TermAgreement {
    pub id: i64,
    pub term_id: i64,
    pub user_id: i64,
    pub is_agreed: bool,
    pub updated_at: DateTime<Utc>,
}
