//! Terms Endpoints
//!
//! 약관 조회와 동의 기록. 각 약관은 `version || content` 해시로 개정본을 식별함
//! (비어 있으면 조회 시 계산해서 채움)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{page_request, parse_enum, PageQuery};
use crate::auth::AuthUser;
use crate::db::{Term, TermAgreement, TermCategory};
use crate::error::ApiError;
use crate::services::term_hash::term_hash;
use crate::types::{Paginated, TermAgreementType};
use crate::AppState;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct TermListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub term_category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AgreementRequest {
    pub is_agreed: bool,
}

#[derive(Debug, Serialize)]
pub struct TermResponse {
    pub id: i64,
    pub term_category_id: i64,
    pub agreement_type: String,
    pub name: String,
    pub content: String,
    pub version: String,
    pub hash: String,
    pub priority: i16,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TermCategoryResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AgreementResponse {
    pub id: i64,
    pub term_id: i64,
    pub is_agreed: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<TermCategory> for TermCategoryResponse {
    fn from(category: TermCategory) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

impl From<TermAgreement> for AgreementResponse {
    fn from(agreement: TermAgreement) -> Self {
        Self {
            id: agreement.id,
            term_id: agreement.term_id,
            is_agreed: agreement.is_agreed,
            updated_at: agreement.updated_at,
        }
    }
}

// ============ Handlers ============

/// GET /terms
pub async fn list_terms(
    State(state): State<AppState>,
    Query(query): Query<TermListQuery>,
) -> Result<Json<Paginated<TermResponse>>, ApiError> {
    let page = page_request(&state, query.page, query.page_size);
    let (terms, total) = state.db.list_terms(query.term_category_id, page).await?;

    let mut results = Vec::with_capacity(terms.len());
    for term in terms {
        results.push(with_hash(&state, term).await);
    }

    Ok(Json(Paginated::new(results, page, total)))
}

/// GET /terms/:id
pub async fn get_term(
    State(state): State<AppState>,
    Path(term_id): Path<i64>,
) -> Result<Json<TermResponse>, ApiError> {
    let term = state
        .db
        .get_term(term_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Term".to_string()))?;

    Ok(Json(with_hash(&state, term).await))
}

/// GET /term-categories
pub async fn list_term_categories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<TermCategoryResponse>>, ApiError> {
    let page = query.resolve(&state);
    let (categories, total) = state.db.list_term_categories(page).await?;

    Ok(Json(Paginated::new(
        categories.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

/// POST /terms/:id/agreement
///
/// 필수 약관은 거부(is_agreed = false)할 수 없음
pub async fn agree_term(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(term_id): Path<i64>,
    Json(req): Json<AgreementRequest>,
) -> Result<Json<AgreementResponse>, ApiError> {
    let term = state
        .db
        .get_term(term_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Term".to_string()))?;

    let agreement_type: TermAgreementType = parse_enum(&term.agreement_type)?;
    if agreement_type == TermAgreementType::Required && !req.is_agreed {
        return Err(ApiError::ValidationError(
            "Required terms cannot be declined".to_string(),
        ));
    }

    let agreement = state
        .db
        .upsert_term_agreement(term_id, auth.user_id.0, req.is_agreed)
        .await?;

    tracing::info!(
        term_id,
        user_id = %auth.user_id,
        is_agreed = req.is_agreed,
        "Term agreement recorded"
    );
    Ok(Json(agreement.into()))
}

/// 저장된 hash가 없으면 계산 후 저장 (저장 실패는 응답에 영향 없음)
async fn with_hash(state: &AppState, term: Term) -> TermResponse {
    let hash = match term.hash.clone() {
        Some(hash) => hash,
        None => {
            let hash = term_hash(&term.version, &term.content);
            if let Err(e) = state.db.backfill_term_hash(term.id, &hash).await {
                tracing::warn!("Failed to store hash for term {}: {:?}", term.id, e);
            }
            hash
        }
    };

    TermResponse {
        id: term.id,
        term_category_id: term.term_category_id,
        agreement_type: term.agreement_type,
        name: term.name,
        content: term.content,
        version: term.version,
        hash,
        priority: term.priority,
        updated_at: term.updated_at,
    }
}
