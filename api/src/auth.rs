//! Bearer 토큰 인증
//!
//! `Authorization: Bearer <token>` + 선택적 `X-Device-Id` 헤더.
//! 토큰 발급(OAuth 공급자 검증)은 외부에서 처리하고, 여기서는
//! `user_access_tokens` 세션만 확인함.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use chrono::{DateTime, Utc};
use moree_draw::UserId;

use crate::db::Session;
use crate::error::ApiError;
use crate::types::UserStatus;
use crate::AppState;

pub const DEVICE_ID_HEADER: &str = "x-device-id";

/// 인증된 요청의 회원
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub device_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let device_id = parts
            .headers
            .get(DEVICE_ID_HEADER)
            .and_then(|value| value.to_str().ok());

        let session = state
            .db
            .find_session(token)
            .await?
            .ok_or(ApiError::InvalidAccessToken)?;

        let user = check_session(&session, device_id, Utc::now())?;
        tracing::debug!(user_id = %user.user_id, "Authenticated request");
        Ok(user)
    }
}

/// `Authorization` 헤더에서 토큰 추출
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

/// 세션 유효성 검사: 만료 → 디바이스 → 회원 상태 순
pub fn check_session(
    session: &Session,
    device_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<AuthUser, ApiError> {
    if session.expire_at <= now {
        return Err(ApiError::AccessTokenExpired);
    }

    // 헤더가 없으면 디바이스 검사 생략
    if let Some(device_id) = device_id {
        if device_id != session.device_id {
            return Err(ApiError::InvalidDeviceId);
        }
    }

    match session.user_status.parse::<UserStatus>() {
        Ok(UserStatus::Active) => {}
        _ => return Err(ApiError::NotFound("User".to_string())),
    }

    Ok(AuthUser {
        user_id: UserId(session.user_id),
        device_id: session.device_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn session(status: &str, expires_in: Duration) -> Session {
        Session {
            user_id: 42,
            device_id: "device-a".to_string(),
            expire_at: Utc::now() + expires_in,
            user_status: status.to_string(),
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  abc123 "));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_valid_session() {
        let s = session("ACTIVE", Duration::hours(1));
        let user = check_session(&s, Some("device-a"), Utc::now()).unwrap();
        assert_eq!(user.user_id, UserId(42));

        // 디바이스 헤더 없이도 허용
        assert!(check_session(&s, None, Utc::now()).is_ok());
    }

    #[test]
    fn test_expired_session() {
        let s = session("ACTIVE", Duration::hours(-1));
        assert!(matches!(
            check_session(&s, Some("device-a"), Utc::now()),
            Err(ApiError::AccessTokenExpired)
        ));
    }

    #[test]
    fn test_device_mismatch() {
        let s = session("ACTIVE", Duration::hours(1));
        assert!(matches!(
            check_session(&s, Some("device-b"), Utc::now()),
            Err(ApiError::InvalidDeviceId)
        ));
    }

    #[test]
    fn test_inactive_user() {
        for status in ["DORMANT", "WITHDRAWN"] {
            let s = session(status, Duration::hours(1));
            assert!(matches!(
                check_session(&s, None, Utc::now()),
                Err(ApiError::NotFound(_))
            ));
        }
    }
}
