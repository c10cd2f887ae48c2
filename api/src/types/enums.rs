//! 문자열 enum
//!
//! DB 컬럼은 VARCHAR, JSON은 대문자 문자열 그대로 사용

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_uppercase().as_str() {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!("Unknown {}: {}", stringify!($name), s)),
                }
            }
        }
    };
}

string_enum!(
    /// 공통 레코드 상태
    Status {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
        Deleted => "DELETED",
    }
);

string_enum!(
    /// 회원 상태
    UserStatus {
        Active => "ACTIVE",
        Dormant => "DORMANT",
        Withdrawn => "WITHDRAWN",
    }
);

string_enum!(
    Gender {
        Male => "MALE",
        Female => "FEMALE",
    }
);

string_enum!(
    /// 북마크 공개 범위
    BookmarkVisibility {
        Public => "PUBLIC",
        FriendsOnly => "FRIENDS_ONLY",
        Private => "PRIVATE",
    }
);

string_enum!(
    /// 리뷰 신고 사유
    ReportReason {
        Spam => "SPAM",
        Scam => "SCAM",
        Abuse => "ABUSE",
        Harassment => "HARASSMENT",
        InappropriateContent => "INAPPROPRIATE_CONTENT",
        Misinformation => "MISINFORMATION",
        Other => "OTHER",
    }
);

string_enum!(
    /// 약관 동의 유형
    TermAgreementType {
        Required => "REQUIRED",
        Optional => "OPTIONAL",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!("active".parse::<Status>(), Ok(Status::Active));
        assert_eq!(
            "FRIENDS_ONLY".parse::<BookmarkVisibility>(),
            Ok(BookmarkVisibility::FriendsOnly)
        );
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn test_serde_uses_db_strings() {
        let json = serde_json::to_string(&ReportReason::InappropriateContent).unwrap();
        assert_eq!(json, r#""INAPPROPRIATE_CONTENT""#);

        let parsed: UserStatus = serde_json::from_str(r#""WITHDRAWN""#).unwrap();
        assert_eq!(parsed, UserStatus::Withdrawn);
    }
}
