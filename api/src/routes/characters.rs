//! Character Endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::page_request;
use crate::db::Character;
use crate::error::ApiError;
use crate::types::Paginated;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CharacterListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub name_contains: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub profile_img_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Character> for CharacterResponse {
    fn from(character: Character) -> Self {
        Self {
            id: character.id,
            name: character.name,
            description: character.description,
            profile_img_url: character.profile_img_url,
            created_at: character.created_at,
        }
    }
}

/// GET /characters
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<CharacterListQuery>,
) -> Result<Json<Paginated<CharacterResponse>>, ApiError> {
    let page = page_request(&state, query.page, query.page_size);
    let name = query.name_contains.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let (characters, total) = state.db.list_characters(name, page).await?;

    Ok(Json(Paginated::new(
        characters.into_iter().map(Into::into).collect(),
        page,
        total,
    )))
}

/// GET /characters/:id
pub async fn get_character(
    State(state): State<AppState>,
    Path(character_id): Path<i64>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let character = state
        .db
        .get_character(character_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Character".to_string()))?;

    Ok(Json(character.into()))
}
