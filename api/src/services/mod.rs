//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `DrawService`: 매장 캐릭터 뽑기 (풀 조회 → 엔진 → 인벤토리 기록 → 감사 로그)
//! - `term_hash`: 약관 본문 해시

mod draw;
pub mod term_hash;

pub use draw::{AwardedCharacter, DrawService, DrawServiceError};
