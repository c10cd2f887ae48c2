//! 약관 해시
//!
//! 약관 개정 식별용. `version || content`의 SHA3-256을 hex로 표현

use sha3::{Digest, Sha3_256};

pub fn term_hash(version: &str, content: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(version.as_bytes());
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format() {
        let hash = term_hash("1.0", "이용약관");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_empty_input_matches_known_digest() {
        assert_eq!(
            term_hash("", ""),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn test_version_changes_hash() {
        let content = "개인정보 수집 및 이용 동의";
        assert_ne!(term_hash("1.0", content), term_hash("1.1", content));
        // 연결 결과가 같으면 해시도 같음
        assert_eq!(term_hash("1.0", "abc"), term_hash("1.0a", "bc"));
    }
}
