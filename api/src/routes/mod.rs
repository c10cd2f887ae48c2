//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크
//! - `/users/*` - 회원, 내 인벤토리, 북마크
//! - `/store-categories/*`, `/stores/*` - 매장 조회/관리
//! - `/stores/:id/pool`, `/stores/:id/draw` - 캐릭터 풀과 뽑기
//! - `/stores/:id/reviews`, `/reviews/:id/reports` - 리뷰
//! - `/characters/*` - 캐릭터
//! - `/terms/*`, `/term-categories` - 약관

pub mod bookmarks;
pub mod characters;
pub mod draw;
pub mod health;
pub mod pool;
pub mod reviews;
pub mod stores;
pub mod terms;
pub mod users;

use serde::Deserialize;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::db::Store;
use crate::types::PageRequest;
use crate::AppState;

/// 공통 페이지 쿼리 (`?page=1&page_size=20`)
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn resolve(&self, state: &AppState) -> PageRequest {
        page_request(state, self.page, self.page_size)
    }
}

/// 설정된 기본 페이지 크기 적용
pub(crate) fn page_request(
    state: &AppState,
    page: Option<u32>,
    page_size: Option<u32>,
) -> PageRequest {
    PageRequest::new(page, page_size, state.config.page_size, DEFAULT_PAGE_SIZE)
}

/// 공개 조회와 뽑기 대상 매장 (ACTIVE만). 없으면 404
pub(crate) async fn require_active_store(
    state: &AppState,
    store_id: i64,
) -> Result<Store, crate::ApiError> {
    found(state.db.get_store(store_id).await?, "Store")
}

pub(crate) fn found<T>(value: Option<T>, resource: &str) -> Result<T, crate::ApiError> {
    value.ok_or_else(|| crate::ApiError::NotFound(resource.to_string()))
}

/// PATCH 본문용: 필드가 없으면 None, null이면 Some(None)
///
/// `#[serde(default, deserialize_with = "nullable")]`와 함께 사용
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// 필수 문자열 필드 검증 (공백만 있으면 실패)
pub(crate) fn require_text(
    field: &str,
    value: &str,
    max_len: usize,
) -> Result<(), crate::ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::ApiError::ValidationError(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(crate::ApiError::ValidationError(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// 문자열 enum 파싱 실패를 검증 에러로
pub(crate) fn parse_enum<T>(value: &str) -> Result<T, crate::ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse::<T>().map_err(crate::ApiError::ValidationError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "카페 모리", 255).is_ok());
        assert!(require_text("title", "   ", 255).is_err());
        assert!(require_text("title", "abcdef", 5).is_err());
    }

    #[test]
    fn test_parse_enum() {
        let gender: Gender = parse_enum("female").unwrap();
        assert_eq!(gender, Gender::Female);
        assert!(matches!(
            parse_enum::<Gender>("other"),
            Err(crate::ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        assert_eq!(found(Some(3), "Store").unwrap(), 3);
        assert!(matches!(
            found::<i64>(None, "Store"),
            Err(crate::ApiError::NotFound(resource)) if resource == "Store"
        ));
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_missing_and_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.note, None);

        let null: Patch = serde_json::from_str(r#"{"note":null}"#).unwrap();
        assert_eq!(null.note, Some(None));

        let set: Patch = serde_json::from_str(r#"{"note":"hi"}"#).unwrap();
        assert_eq!(set.note, Some(Some("hi".to_string())));
    }
}
