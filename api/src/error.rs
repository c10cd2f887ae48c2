//! API Error
//!
//! 모든 핸들러는 `Result<_, ApiError>`를 반환하고, 여기서 HTTP 상태 코드와
//! `{ error, code, details }` 응답 본문으로 변환됨.
//! 뽑기 엔진 에러는 심각도에 따라 4xx(업무 거절) 또는 500(풀 데이터 오류)으로 나뉨.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moree_draw::{DrawError, Severity};
use serde::Serialize;
use thiserror::Error;

/// API 에러 타입
///
/// # Design Decision
///
/// variant마다 상태 코드와 `code` 문자열이 하나씩 대응
/// - 클라이언트 에러: 4xx (잘못된 요청, 인증 실패, 이미 뽑기 완료 등)
/// - 서버 에러: 5xx (내부 오류, 풀 데이터 무결성 위반)
///
/// 5xx 응답 본문에는 내부 메시지를 싣지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ============ 401 Unauthorized ============
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Expired access token")]
    AccessTokenExpired,

    #[error("Access token's device_id does not match")]
    InvalidDeviceId,

    // ============ 404 Not Found ============
    #[error("{0} not found")]
    NotFound(String),

    // ============ 409 Conflict ============
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already drawn at this store")]
    AlreadyDrawn,

    // ============ 422 Unprocessable Entity ============
    #[error("Nothing available to draw")]
    EmptyPool,

    // ============ 500 Internal Server Error ============
    #[error("Draw pool integrity error: {0}")]
    DrawIntegrity(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error")]
    InternalError,
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP 상태 코드와 응답 code 문자열
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::InvalidAccessToken => (StatusCode::UNAUTHORIZED, "INVALID_ACCESS_TOKEN"),
            ApiError::AccessTokenExpired => (StatusCode::UNAUTHORIZED, "ACCESS_TOKEN_EXPIRED"),
            ApiError::InvalidDeviceId => (StatusCode::UNAUTHORIZED, "INVALID_DEVICE_ID"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::AlreadyDrawn => (StatusCode::CONFLICT, "ALREADY_DRAWN"),
            ApiError::EmptyPool => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_POOL"),
            ApiError::DrawIntegrity(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DRAW_INTEGRITY_ERROR")
            }
            ApiError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::InternalError => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match &self {
            // 4xx 클라이언트 에러
            ApiError::ValidationError(msg) => ("Validation failed".to_string(), Some(msg.clone())),
            ApiError::NotFound(resource) => (format!("{} not found", resource), None),
            ApiError::Conflict(msg) => (msg.clone(), None),

            // 5xx 서버 에러: 내부 상세 정보는 클라이언트에 노출 안 함
            ApiError::DrawIntegrity(_) => {
                tracing::error!("Draw integrity error: {:?}", self);
                ("An internal error occurred".to_string(), None)
            }
            ApiError::DatabaseError(_) => {
                tracing::error!("Database error: {:?}", self);
                ("Database error occurred".to_string(), None)
            }
            ApiError::InternalError => {
                tracing::error!("Internal error: {:?}", self);
                ("An internal error occurred".to_string(), None)
            }

            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// 뽑기 에러를 ApiError로 변환
///
/// 사전 체크에서 나온 중복과 INSERT 경합에서 나온 중복은 같은 응답으로 매핑됨
impl From<DrawError> for ApiError {
    fn from(err: DrawError) -> Self {
        if err.severity() == Severity::Integrity {
            tracing::error!("Draw pool integrity violation: {}", err);
        }
        match err {
            DrawError::DuplicateDraw { .. } => ApiError::AlreadyDrawn,
            DrawError::EmptyPool { .. } => ApiError::EmptyPool,
            DrawError::InvalidWeight { .. } | DrawError::StoreMismatch { .. } => {
                ApiError::DrawIntegrity(err.to_string())
            }
        }
    }
}

/// SQLx 에러를 ApiError로 변환
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = ?err, "Query failed");
        ApiError::DatabaseError(err.to_string())
    }
}

/// DB 계층(anyhow) 에러는 상세를 숨기고 500
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "Unhandled error");
        ApiError::InternalError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moree_draw::{CharacterId, StoreId, UserId};

    #[test]
    fn test_draw_error_mapping() {
        let duplicate = ApiError::from(DrawError::DuplicateDraw {
            user_id: UserId(1),
            store_id: StoreId(2),
        });
        assert_eq!(duplicate.status_and_code(), (StatusCode::CONFLICT, "ALREADY_DRAWN"));

        let empty = ApiError::from(DrawError::EmptyPool { store_id: StoreId(2) });
        assert_eq!(
            empty.status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_POOL")
        );

        let invalid = ApiError::from(DrawError::InvalidWeight {
            store_id: StoreId(2),
            character_id: CharacterId(3),
            weight: 0,
        });
        assert_eq!(invalid.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::NotFound("Store".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::AccessTokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bad_input_maps_to_validation_error() {
        let error = ApiError::ValidationError("weight must be positive".to_string());
        assert_eq!(
            error.status_and_code(),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
    }
}
