//! Draw Service
//!
//! 뽑기 요청 처리 흐름
//!
//! ```text
//! POST /stores/:id/draw
//!        │
//!        ▼
//! ┌──────────────┐   get_active_pool    ┌────────────────┐
//! │ DrawService  │ ───────────────────► │ PoolRepository │
//! │              │   get_record         ├────────────────┤
//! │              │ ───────────────────► │ InventoryStore │
//! │              │                      └────────────────┘
//! │  DrawEngine  │  (동기, 락은 await 전에 해제)
//! │   ::draw     │
//! │   commit     │   insert_if_absent   ┌────────────────┐
//! │              │ ───────────────────► │ InventoryStore │
//! │              │   log_draw           ├────────────────┤
//! │              │ ───────────────────► │ DrawLogStore   │
//! └──────────────┘                      └────────────────┘
//! ```
//!
//! 재시도 없음: 경합으로 INSERT가 막히면 "이미 뽑음"으로 응답

use std::sync::{Arc, Mutex};

use chrono::Utc;
use moree_draw::{
    commit, DrawEngine, DrawError, DrawResult, InventoryRecord, Severity, StoreId, UserId,
};
use thiserror::Error;

use crate::db::{DrawLogStore, InsertOutcome, InventoryStore, PoolRepository};
use crate::error::ApiError;

/// 뽑기 서비스 에러
#[derive(Debug, Error)]
pub enum DrawServiceError {
    #[error(transparent)]
    Draw(#[from] DrawError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<DrawServiceError> for ApiError {
    fn from(err: DrawServiceError) -> Self {
        match err {
            DrawServiceError::Draw(e) => e.into(),
            DrawServiceError::Storage(e) => e.into(),
        }
    }
}

/// 지급 완료된 뽑기
#[derive(Debug, Clone)]
pub struct AwardedCharacter {
    pub result: DrawResult,
    pub record: InventoryRecord,
}

pub struct DrawService {
    pools: Arc<dyn PoolRepository>,
    inventory: Arc<dyn InventoryStore>,
    draw_logs: Arc<dyn DrawLogStore>,
    engine: Mutex<DrawEngine>,
}

impl DrawService {
    pub fn new(
        pools: Arc<dyn PoolRepository>,
        inventory: Arc<dyn InventoryStore>,
        draw_logs: Arc<dyn DrawLogStore>,
        engine: DrawEngine,
    ) -> Self {
        Self {
            pools,
            inventory,
            draw_logs,
            engine: Mutex::new(engine),
        }
    }

    /// 뽑기 실행 후 인벤토리에 기록
    pub async fn draw(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<AwardedCharacter, DrawServiceError> {
        let pool = self.pools.get_active_pool(store_id).await?;
        let existing = self.inventory.get_record(user_id, store_id).await?;

        let outcome = {
            // 엔진은 순수 계산이라 poison 되어도 상태가 깨지지 않음
            let mut engine = self.engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            engine.draw(store_id, user_id, &pool, existing.as_ref())
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                match e.severity() {
                    Severity::Business => {
                        tracing::info!(%user_id, %store_id, "Draw rejected: {}", e)
                    }
                    Severity::Integrity => {
                        tracing::error!(%user_id, %store_id, "Draw pool corrupted: {}", e)
                    }
                }
                return Err(e.into());
            }
        };

        let record = commit(&result, user_id, store_id, Utc::now());

        match self.inventory.insert_if_absent(&record).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::AlreadyPresent => {
                // 동시 요청 경합: 사전 체크와 동일하게 처리
                tracing::warn!(
                    %user_id,
                    %store_id,
                    draw_id = %result.draw_id,
                    "Concurrent draw lost the insert race"
                );
                return Err(DrawError::DuplicateDraw { user_id, store_id }.into());
            }
        }

        tracing::info!(
            %user_id,
            %store_id,
            draw_id = %result.draw_id,
            character_id = %result.character_id,
            roll = result.roll,
            total_weight = result.total_weight,
            snapshot = %serde_json::to_string(&result.pool_snapshot).unwrap_or_default(),
            "Character drawn"
        );

        // 감사 로그 실패는 지급에 영향 없음
        if let Err(e) = self.draw_logs.log_draw(&result).await {
            tracing::warn!("Failed to log draw {}: {:?}", result.draw_id, e);
        }

        Ok(AwardedCharacter { result, record })
    }
}
