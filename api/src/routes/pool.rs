//! Character Pool Endpoints
//!
//! 매장별 뽑기 캐릭터 풀 조회 및 관리.
//! 항목은 삭제하지 않고 비활성화만 함 (인벤토리 이력이 참조)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use moree_draw::{validation, CharacterId, CharacterPoolEntry, StoreId};
use serde::{Deserialize, Serialize};

use super::require_active_store;
use crate::auth::AuthUser;
use crate::db::PoolEntry;
use crate::error::ApiError;
use crate::AppState;

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct AddPoolEntryRequest {
    pub character_id: i64,
    /// 상대 가중치 (> 0)
    pub weight: i32,
}

#[derive(Debug, Serialize)]
pub struct PoolEntryResponse {
    pub id: i64,
    pub character_id: i64,
    pub character_name: String,
    pub weight: i32,
    /// weight / 활성 항목 weight 합
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<PoolEntry> for PoolEntryResponse {
    fn from(entry: PoolEntry) -> Self {
        Self {
            id: entry.id,
            character_id: entry.character_id,
            character_name: entry.character_name,
            weight: entry.weight,
            probability: None,
            status: entry.status,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoolResponse {
    pub store_id: i64,
    pub total_weight: u64,
    pub entries: Vec<PoolEntryResponse>,
}

// ============ Handlers ============

/// GET /stores/:id/pool
///
/// 활성 항목과 각 항목이 뽑힐 확률
pub async fn get_pool(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<PoolResponse>, ApiError> {
    require_active_store(&state, store_id).await?;

    let entries = state.db.list_pool_entries(store_id).await?;
    Ok(Json(pool_response(store_id, entries)))
}

/// POST /stores/:id/pool
pub async fn add_pool_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(store_id): Path<i64>,
    Json(req): Json<AddPoolEntryRequest>,
) -> Result<(StatusCode, Json<PoolEntryResponse>), ApiError> {
    // 뽑기 엔진과 같은 기준으로 검증
    let candidate =
        CharacterPoolEntry::new(StoreId(store_id), CharacterId(req.character_id), req.weight);
    validation::validate_entry(&candidate).map_err(|e| ApiError::ValidationError(e.to_string()))?;

    if !state.db.store_exists(store_id).await? {
        return Err(ApiError::NotFound("Store".to_string()));
    }
    if state.db.get_character(req.character_id).await?.is_none() {
        return Err(ApiError::NotFound("Character".to_string()));
    }

    let entry = state
        .db
        .insert_pool_entry(store_id, req.character_id, req.weight)
        .await?;

    tracing::info!(
        store_id,
        character_id = req.character_id,
        weight = req.weight,
        user_id = %auth.user_id,
        "Pool entry added"
    );
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// DELETE /stores/:id/pool/:entry_id
pub async fn deactivate_pool_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((store_id, entry_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    if !state.db.deactivate_pool_entry(store_id, entry_id).await? {
        return Err(ApiError::NotFound("Pool entry".to_string()));
    }

    tracing::info!(store_id, entry_id, user_id = %auth.user_id, "Pool entry deactivated");
    Ok(StatusCode::NO_CONTENT)
}

fn pool_response(store_id: i64, entries: Vec<PoolEntry>) -> PoolResponse {
    let total_weight: u64 = entries.iter().map(|e| e.weight.max(0) as u64).sum();

    let entries = entries
        .into_iter()
        .map(|entry| {
            let probability =
                (total_weight > 0).then(|| entry.weight.max(0) as f64 / total_weight as f64);
            PoolEntryResponse {
                probability,
                ..PoolEntryResponse::from(entry)
            }
        })
        .collect();

    PoolResponse {
        store_id,
        total_weight,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, character_id: i64, weight: i32) -> PoolEntry {
        PoolEntry {
            id,
            store_id: 1,
            character_id,
            character_name: format!("character-{}", character_id),
            weight,
            status: "ACTIVE".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let response = pool_response(1, vec![entry(1, 10, 1), entry(2, 20, 3)]);
        assert_eq!(response.total_weight, 4);

        let probabilities: Vec<f64> =
            response.entries.iter().filter_map(|e| e.probability).collect();
        assert_eq!(probabilities, vec![0.25, 0.75]);
    }

    #[test]
    fn test_empty_pool_has_no_probabilities() {
        let response = pool_response(1, vec![]);
        assert_eq!(response.total_weight, 0);
        assert!(response.entries.is_empty());
    }
}
