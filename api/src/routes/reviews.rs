//! Review Endpoints
//!
//! 매장 리뷰 조회/작성, 리뷰 신고

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_enum, require_active_store, require_text, PageQuery};
use crate::auth::AuthUser;
use crate::db::Review;
use crate::error::ApiError;
use crate::types::{Paginated, ReportReason};
use crate::AppState;

const MAX_RATING: f64 = 5.0;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub content: String,
    /// 0.00 ~ 5.00
    pub rating: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReportReviewRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub store_id: i64,
    pub content: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            user_name: review.user_name,
            store_id: review.store_id,
            content: review.content,
            rating: review.rating,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: i64,
    pub review_id: i64,
    pub reason: ReportReason,
}

// ============ Handlers ============

/// GET /stores/:id/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<ReviewResponse>>, ApiError> {
    require_active_store(&state, store_id).await?;

    let page = query.resolve(&state);
    let (reviews, total) = state.db.list_reviews(store_id, page).await?;

    Ok(Json(Paginated::new(
        reviews.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

/// POST /stores/:id/reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(store_id): Path<i64>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    require_text("content", &req.content, 2000)?;
    let rating = normalize_rating(req.rating)?;

    require_active_store(&state, store_id).await?;

    let review = state
        .db
        .create_review(auth.user_id.0, store_id, req.content.trim(), rating)
        .await?;

    tracing::info!(review_id = review.id, store_id, user_id = %auth.user_id, "Review created");
    Ok((StatusCode::CREATED, Json(review.into())))
}

/// POST /reviews/:id/reports
pub async fn report_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(review_id): Path<i64>,
    Json(req): Json<ReportReviewRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), ApiError> {
    let reason: ReportReason = parse_enum(&req.reason)?;

    if !state.db.review_exists(review_id).await? {
        return Err(ApiError::NotFound("Review".to_string()));
    }

    let report_id = state
        .db
        .report_review(review_id, auth.user_id.0, reason.as_str())
        .await?;

    tracing::info!(review_id, report_id, %reason, "Review reported");
    Ok((
        StatusCode::CREATED,
        Json(ReportResponse {
            id: report_id,
            review_id,
            reason,
        }),
    ))
}

/// 0~5 범위 확인 후 소수 둘째 자리로 반올림 (NUMERIC(3,2))
fn normalize_rating(rating: f64) -> Result<f64, ApiError> {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ApiError::ValidationError(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    Ok((rating * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rating() {
        assert_eq!(normalize_rating(4.5).unwrap(), 4.5);
        assert_eq!(normalize_rating(3.456).unwrap(), 3.46);
        assert_eq!(normalize_rating(0.0).unwrap(), 0.0);
        assert_eq!(normalize_rating(5.0).unwrap(), 5.0);
    }

    #[test]
    fn test_rating_out_of_range() {
        assert!(normalize_rating(5.01).is_err());
        assert!(normalize_rating(-0.5).is_err());
        assert!(normalize_rating(f64::NAN).is_err());
    }
}
