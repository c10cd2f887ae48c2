//! Moree Loyalty API Server
//!
//! 시작 순서: `.env` → 로깅 → 설정 검증 → DB 연결 → 마이그레이션
//! → 뽑기 엔진/서비스 구성 → 라우터 → 서버
//!
//! 뽑기 요청 한 건의 흐름
//!
//! ```text
//! POST /stores/:id/draw
//!   └─ AuthUser (Bearer 세션 확인)
//!       └─ DrawService::draw
//!           ├─ store_character_pools  (활성 풀)
//!           ├─ user_character_inventories (기존 기록)
//!           ├─ moree-draw 엔진 (가중치 추첨)
//!           ├─ INSERT ... ON CONFLICT DO NOTHING
//!           └─ draw_logs (감사 로그, 실패해도 지급 유지)
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moree_api::{build_state, create_router, Config, Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // 기본값 이외 레벨은 RUST_LOG로 (예: RUST_LOG=moree_api=info,sqlx=warn)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "moree_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Moree API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!(
        environment = ?config.environment,
        page_size = config.page_size,
        "📋 Configuration loaded"
    );

    // 데이터베이스 연결
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("🗄️  Database connected");

    // 마이그레이션 실행
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("📦 Migrations completed");

    let port = config.port;
    let state = build_state(db, config);
    tracing::info!("🎲 Draw service initialized");

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
