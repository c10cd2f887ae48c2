//! 영업 요일 bitmask
//!
//! bit 0 = 월요일 ... bit 6 = 일요일, 127 = 매일

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessDays(pub i16);

impl BusinessDays {
    pub const ALL: BusinessDays = BusinessDays(0b111_1111);

    /// 0..=127 범위만 허용
    pub fn new(mask: i16) -> Result<Self, String> {
        if !(0..=Self::ALL.0).contains(&mask) {
            return Err(format!("business_day must be between 0 and {}", Self::ALL.0));
        }
        Ok(Self(mask))
    }

    pub fn weekday_bit(weekday: Weekday) -> i16 {
        1 << weekday.num_days_from_monday()
    }

    pub fn includes(&self, weekday: Weekday) -> bool {
        self.0 & Self::weekday_bit(weekday) != 0
    }

    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.includes(date.weekday())
    }

    /// 필터 mask 결합: 요청 mask와 특정 날짜의 요일을 모두 만족해야 함
    pub fn filter_mask(mask: Option<i16>, open_on: Option<NaiveDate>) -> Option<i16> {
        match (mask, open_on) {
            (None, None) => None,
            (Some(mask), None) => Some(mask),
            (None, Some(date)) => Some(Self::weekday_bit(date.weekday())),
            (Some(mask), Some(date)) => Some(mask & Self::weekday_bit(date.weekday())),
        }
    }
}

impl Default for BusinessDays {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_range() {
        assert!(BusinessDays::new(0).is_ok());
        assert!(BusinessDays::new(127).is_ok());
        assert!(BusinessDays::new(128).is_err());
        assert!(BusinessDays::new(-1).is_err());
    }

    #[test]
    fn test_weekday_bits() {
        // 평일만 (월~금)
        let weekdays = BusinessDays(0b001_1111);
        assert!(weekdays.includes(Weekday::Mon));
        assert!(weekdays.includes(Weekday::Fri));
        assert!(!weekdays.includes(Weekday::Sat));
        assert!(!weekdays.includes(Weekday::Sun));

        // 2024-06-01 = 토요일
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(!weekdays.is_open_on(saturday));
        assert!(BusinessDays::ALL.is_open_on(saturday));
    }

    #[test]
    fn test_filter_mask() {
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(BusinessDays::filter_mask(None, None), None);
        assert_eq!(BusinessDays::filter_mask(Some(3), None), Some(3));
        assert_eq!(BusinessDays::filter_mask(None, Some(saturday)), Some(0b010_0000));
        // 평일 mask + 토요일 → 0 (아무 매장도 매칭 안 됨)
        assert_eq!(BusinessDays::filter_mask(Some(0b001_1111), Some(saturday)), Some(0));
    }
}
