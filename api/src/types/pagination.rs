//! 페이지 번호 기반 페이지네이션
//!
//! `page`는 1부터 시작, 응답에 `current_page`/`max_page` 포함

use serde::Serialize;

/// 해석된 페이지 요청
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// 쿼리 파라미터 해석
    ///
    /// - page: 없거나 0이면 1
    /// - page_size: 없으면 기본값, 최대 `max_size`
    pub fn new(
        page: Option<u32>,
        page_size: Option<u32>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, max_size),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total: u64,
    pub max_page: u32,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total = total.max(0) as u64;
        // 결과가 없어도 첫 페이지는 존재
        let max_page = total.div_ceil(request.page_size as u64).max(1) as u32;
        Self {
            current_page: request.page,
            page_size: request.page_size,
            total,
            max_page,
            has_next: request.page < max_page,
        }
    }
}

/// 목록 응답
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(results: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            results,
            pagination: Pagination::new(request, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let req = PageRequest::new(None, None, 500, 500);
        assert_eq!(req, PageRequest { page: 1, page_size: 500 });
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(0), Some(10_000), 500, 500);
        assert_eq!(req, PageRequest { page: 1, page_size: 500 });

        let req = PageRequest::new(Some(3), Some(20), 500, 500);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_pagination() {
        let req = PageRequest::new(Some(1), Some(20), 500, 500);
        let p = Pagination::new(req, 45);
        assert_eq!(p.max_page, 3);
        assert!(p.has_next);

        let req = PageRequest::new(Some(3), Some(20), 500, 500);
        assert!(!Pagination::new(req, 45).has_next);

        // 빈 결과
        let p = Pagination::new(PageRequest::new(None, None, 500, 500), 0);
        assert_eq!(p.max_page, 1);
        assert!(!p.has_next);
    }
}
