//! Moree Loyalty API Library
//!
//! # Overview
//!
//! 매장 방문 리워드 서비스 백엔드. 매장마다 캐릭터 풀이 있고,
//! 회원은 매장당 한 번 가중치 기반으로 캐릭터를 뽑아 수집함.
//!
//! ## Layers
//!
//! ```text
//! routes ──► services ──► db (PostgreSQL)
//!   │           │
//!   │           └──► moree-draw (가중치 뽑기 엔진, I/O 없음)
//!   └──► auth / types / error
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 HTTP 매핑
//! - `auth`: Bearer 토큰 세션 인증
//! - `routes`: 엔드포인트별 핸들러와 요청/응답 타입
//! - `services`: 뽑기 서비스, 약관 해시
//! - `db`: PostgreSQL 연동
//! - `types`: 공통 타입 (페이지네이션, 요일 mask, 문자열 enum)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use moree_api::{build_state, create_router, config::Config, db::Database};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::connect(&config.database_url).await?;
//!     let app = create_router(build_state(db, config));
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use moree_draw::DrawEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

pub use config::Config;
pub use db::Database;
pub use error::ApiError;
pub use services::DrawService;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub draw_service: Arc<DrawService>,
    pub config: Arc<Config>,
}

/// DB 하나로 뽑기 서비스의 세 저장소를 모두 구현
pub fn build_state(db: Database, config: Config) -> AppState {
    let db = Arc::new(db);

    let engine = match config.draw_seed {
        Some(seed) => {
            tracing::warn!(seed, "Draw engine seeded: results are reproducible");
            DrawEngine::seeded(seed)
        }
        None => DrawEngine::from_entropy(),
    };

    let draw_service = DrawService::new(db.clone(), db.clone(), db.clone(), engine);

    AppState {
        db,
        draw_service: Arc::new(draw_service),
        config: Arc::new(config),
    }
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET    /health                        - 서버 상태 확인
///
/// POST   /users                         - 회원 가입
/// GET    /users/me                      - 내 정보          (auth)
/// PATCH  /users/me                      - 내 정보 수정     (auth)
/// DELETE /users/me                      - 탈퇴             (auth)
/// GET    /users/me/inventory            - 내 캐릭터        (auth)
/// GET    /users/me/bookmarks            - 북마크 목록      (auth)
/// POST   /users/me/bookmarks            - 북마크 생성      (auth)
/// DELETE /users/me/bookmarks/:id        - 북마크 삭제      (auth)
///
/// GET    /store-categories[/:id]        - 매장 카테고리
/// GET    /stores[/:id]                  - 매장 조회
/// POST   /stores                        - 매장 생성        (auth)
/// PATCH  /stores/:id                    - 매장 수정        (auth)
/// DELETE /stores/:id                    - 매장 삭제        (auth)
/// GET    /stores/:id/pool               - 캐릭터 풀 + 확률
/// POST   /stores/:id/pool               - 풀 항목 추가     (auth)
/// DELETE /stores/:id/pool/:entry_id     - 풀 항목 비활성화 (auth)
/// POST   /stores/:id/draw               - 캐릭터 뽑기      (auth)
/// GET    /stores/:id/reviews            - 리뷰 목록
/// POST   /stores/:id/reviews            - 리뷰 작성        (auth)
/// POST   /reviews/:id/reports           - 리뷰 신고        (auth)
///
/// GET    /characters[/:id]              - 캐릭터
/// GET    /terms[/:id]                   - 약관
/// GET    /term-categories               - 약관 카테고리
/// POST   /terms/:id/agreement           - 약관 동의        (auth)
/// ```
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Users
        .route("/users", post(routes::users::sign_up))
        .route(
            "/users/me",
            get(routes::users::get_me)
                .patch(routes::users::update_me)
                .delete(routes::users::withdraw_me),
        )
        .route("/users/me/inventory", get(routes::users::get_my_inventory))
        .route(
            "/users/me/bookmarks",
            get(routes::bookmarks::list_bookmarks).post(routes::bookmarks::create_bookmark),
        )
        .route("/users/me/bookmarks/:id", delete(routes::bookmarks::delete_bookmark))

        // Stores
        .route("/store-categories", get(routes::stores::list_store_categories))
        .route("/store-categories/:id", get(routes::stores::get_store_category))
        .route(
            "/stores",
            get(routes::stores::list_stores).post(routes::stores::create_store),
        )
        .route(
            "/stores/:id",
            get(routes::stores::get_store)
                .patch(routes::stores::update_store)
                .delete(routes::stores::delete_store),
        )

        // Character pool / draw
        .route(
            "/stores/:id/pool",
            get(routes::pool::get_pool).post(routes::pool::add_pool_entry),
        )
        .route("/stores/:id/pool/:entry_id", delete(routes::pool::deactivate_pool_entry))
        .route("/stores/:id/draw", post(routes::draw::draw_character))

        // Reviews
        .route(
            "/stores/:id/reviews",
            get(routes::reviews::list_reviews).post(routes::reviews::create_review),
        )
        .route("/reviews/:id/reports", post(routes::reviews::report_review))

        // Characters
        .route("/characters", get(routes::characters::list_characters))
        .route("/characters/:id", get(routes::characters::get_character))

        // Terms
        .route("/terms", get(routes::terms::list_terms))
        .route("/terms/:id", get(routes::terms::get_term))
        .route("/terms/:id/agreement", post(routes::terms::agree_term))
        .route("/term-categories", get(routes::terms::list_term_categories))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}

/// CORS 설정
///
/// 프로덕션은 `ALLOWED_ORIGINS` 목록만 허용, 그 외 환경은 localhost 개발 서버 허용
fn cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
    ];
    let device_header = header::HeaderName::from_static(auth::DEVICE_ID_HEADER);

    if config.is_production() {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, device_header])
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:5173"), // Vite dev server
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:5173"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
