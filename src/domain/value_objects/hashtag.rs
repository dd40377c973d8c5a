use serde::{Deserialize, Serialize};
use std::fmt;

/// 正規化済みハッシュタグ
///
/// 先頭の `#` を除去し小文字化した形で保持する。空白を含む入力は拒否。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hashtag(String);

impl Hashtag {
    pub fn new(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().trim_start_matches('#').to_lowercase();
        if normalized.is_empty() {
            return Err("Hashtag must not be empty".to_string());
        }
        if normalized.contains(char::is_whitespace) {
            return Err(format!("Invalid hashtag: {raw}"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hashtag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_prefix_and_lowercases() {
        let tag = Hashtag::new("#Coffee").unwrap();
        assert_eq!(tag.as_str(), "coffee");
        assert_eq!(tag.to_string(), "#coffee");
    }

    #[test]
    fn test_new_rejects_empty_and_whitespace() {
        assert!(Hashtag::new("").is_err());
        assert!(Hashtag::new("#").is_err());
        assert!(Hashtag::new("two words").is_err());
    }
}
