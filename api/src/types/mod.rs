//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의
//! - 문자열 enum (DB에는 대문자 문자열로 저장)
//! - 페이지네이션
//! - 영업 요일 bitmask

mod business_day;
mod enums;
mod pagination;

pub use business_day::BusinessDays;
pub use enums::{
    BookmarkVisibility, Gender, ReportReason, Status, TermAgreementType, UserStatus,
};
pub use pagination::{PageRequest, Paginated, Pagination};
