//! Database Module
//!
//! PostgreSQL + SQLx 기반 데이터 계층
//!
//! - `models`: 테이블 row 타입
//! - `repository`: 뽑기 서비스가 의존하는 trait (풀 조회, 인벤토리, 감사 로그)
//! - 나머지 파일: 도메인별 `impl Database` 쿼리
//!
//! # Connection Pool
//!
//! SQLx PgPool 사용
//! - 최소/최대 커넥션 수 설정
//! - 커넥션 재사용 (오버헤드 감소)
//! - 타임아웃 처리

mod bookmarks;
mod catalog;
mod models;
pub mod repository;
mod reviews;
mod stores;
mod terms;
mod users;

pub use models::*;
pub use repository::{DrawLogStore, InsertOutcome, InventoryStore, PoolRepository};
pub use stores::{NewStore, StorePatch, StoreQuery};
pub use users::{NewUser, UserPatch};
use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (트래픽에 따라 조정)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
