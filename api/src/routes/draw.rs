//! Draw Endpoint
//!
//! 매장 캐릭터 뽑기. 유저당 매장별 1회
//!
//! # Error Responses
//!
//! | 상황 | status | code |
//! |------|--------|------|
//! | 이미 뽑음 (동시 요청 포함) | 409 | `ALREADY_DRAWN` |
//! | 뽑을 캐릭터 없음 | 422 | `EMPTY_POOL` |
//! | 풀 데이터 오류 | 500 | `DRAW_INTEGRITY_ERROR` |

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use moree_draw::StoreId;
use serde::Serialize;
use uuid::Uuid;

use super::require_active_store;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::AwardedCharacter;
use crate::AppState;

// ============ Request/Response Types ============

#[derive(Debug, Serialize)]
pub struct DrawResponse {
    pub draw_id: Uuid,
    pub store_id: i64,
    pub character: DrawnCharacter,
    /// 뽑기 시점의 당첨 확률
    pub probability: f64,
    pub obtained_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DrawnCharacter {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub profile_img_url: Option<String>,
}

// ============ Handlers ============

/// POST /stores/:id/draw
pub async fn draw_character(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(store_id): Path<i64>,
) -> Result<(StatusCode, Json<DrawResponse>), ApiError> {
    require_active_store(&state, store_id).await?;

    let awarded = state
        .draw_service
        .draw(auth.user_id, StoreId(store_id))
        .await?;

    // 지급은 끝났으므로 캐릭터 상세 조회 실패는 응답만 축약
    let character = match state.db.get_character(awarded.record.character_id.0).await {
        Ok(character) => character,
        Err(e) => {
            tracing::warn!(
                "Failed to load drawn character {}: {:?}",
                awarded.record.character_id,
                e
            );
            None
        }
    };

    Ok((StatusCode::CREATED, Json(draw_response(awarded, character))))
}

fn draw_response(
    awarded: AwardedCharacter,
    character: Option<crate::db::Character>,
) -> DrawResponse {
    let probability = awarded.result.winning_probability();
    let character_id = awarded.record.character_id.0;

    DrawResponse {
        draw_id: awarded.result.draw_id,
        store_id: awarded.record.store_id.0,
        character: match character {
            Some(c) => DrawnCharacter {
                id: c.id,
                name: Some(c.name),
                description: Some(c.description),
                profile_img_url: c.profile_img_url,
            },
            None => DrawnCharacter {
                id: character_id,
                name: None,
                description: None,
                profile_img_url: None,
            },
        },
        probability,
        obtained_at: awarded.record.awarded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moree_draw::{commit, CharacterId, CharacterPoolEntry, DrawEngine, UserId};

    fn awarded() -> AwardedCharacter {
        let store = StoreId(3);
        let pool = vec![
            CharacterPoolEntry::new(store, CharacterId(1), 1),
            CharacterPoolEntry::new(store, CharacterId(2), 1),
        ];
        let result = DrawEngine::seeded(1).draw(store, UserId(5), &pool, None).unwrap();
        let record = commit(&result, UserId(5), store, Utc::now());
        AwardedCharacter { result, record }
    }

    #[test]
    fn test_response_without_character_details() {
        let awarded = awarded();
        let character_id = awarded.record.character_id.0;

        let response = draw_response(awarded, None);
        assert_eq!(response.store_id, 3);
        assert_eq!(response.character.id, character_id);
        assert!(response.character.name.is_none());
        assert_eq!(response.probability, 0.5);
    }

    #[test]
    fn test_response_serializes_draw_id() {
        let response = draw_response(awarded(), None);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["draw_id"], serde_json::json!(response.draw_id.to_string()));
        assert_eq!(json["store_id"], 3);
    }
}
