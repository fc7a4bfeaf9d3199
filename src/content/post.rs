//! Post summary model

use serde::{Deserialize, Serialize};

/// One entry of the post manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Post title
    pub title: String,

    /// Display date, not validated
    #[serde(default)]
    pub date: String,

    /// Short description shown on the card
    #[serde(default)]
    pub excerpt: String,

    /// Category label; empty means none
    #[serde(default)]
    pub category: String,

    /// Post tags, in manifest order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Document identifier relative to the pages directory
    pub file: String,
}

impl PostSummary {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Parse a manifest document
pub fn parse_manifest(json: &str) -> serde_json::Result<Vec<PostSummary>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let json = r#"[
            {"title": "A", "date": "2024-01-01", "excerpt": "e", "category": "c", "tags": ["x", "y"], "file": "a.md"},
            {"title": "B", "file": "b.md"}
        ]"#;
        let posts = parse_manifest(json).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].tags, vec!["x", "y"]);
        assert!(posts[0].has_tag("x"));
        assert!(!posts[0].has_tag("X"));
        assert_eq!(posts[1].category, "");
        assert!(posts[1].tags.is_empty());
    }

    #[test]
    fn test_manifest_requires_file() {
        assert!(parse_manifest(r#"[{"title": "A"}]"#).is_err());
        assert!(parse_manifest(r#"{"title": "A", "file": "a.md"}"#).is_err());
    }
}
