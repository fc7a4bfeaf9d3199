//! Tag filtering and free-text search over the post collection
//!
//! Both filters are pure predicates: the visible set is recomputed from the
//! full collection and the current [`FilterState`] every time, and the
//! relative order of the collection is always kept.

use std::collections::BTreeSet;

use crate::content::PostSummary;

/// Implicit tag that selects every post
pub const ALL_TAG: &str = "all";

/// Current tag selection and search box contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub active_tag: String,
    pub search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active_tag: ALL_TAG.to_string(),
            search_term: String::new(),
        }
    }
}

impl FilterState {
    pub fn new(tag: Option<&str>, search: Option<&str>) -> Self {
        Self {
            active_tag: tag
                .filter(|t| !t.is_empty())
                .unwrap_or(ALL_TAG)
                .to_string(),
            search_term: search.unwrap_or_default().to_string(),
        }
    }

    /// Posts visible under this state
    pub fn visible(&self, posts: &[PostSummary]) -> Vec<PostSummary> {
        compute_visible(posts, &self.active_tag, &self.search_term)
    }

    pub fn is_all(&self) -> bool {
        self.active_tag == ALL_TAG
    }
}

/// Apply the tag filter, then the search filter, preserving order
pub fn compute_visible(posts: &[PostSummary], tag: &str, search_term: &str) -> Vec<PostSummary> {
    let search = SearchTerm::new(search_term);
    posts
        .iter()
        .filter(|post| tag == ALL_TAG || post.has_tag(tag))
        .filter(|post| search.as_ref().map_or(true, |s| s.matches(post)))
        .cloned()
        .collect()
}

/// A lower-cased, non-blank search term
struct SearchTerm(String);

impl SearchTerm {
    fn new(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_lowercase()))
        }
    }

    fn matches(&self, post: &PostSummary) -> bool {
        let term = self.0.as_str();
        post.title.to_lowercase().contains(term)
            || post.excerpt.to_lowercase().contains(term)
            || post.tags.iter().any(|t| t.to_lowercase().contains(term))
            || post.category.to_lowercase().contains(term)
    }
}

/// Distinct tags for the filter bar, sorted; never includes [`ALL_TAG`]
pub fn collect_tags(posts: &[PostSummary]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|p| p.tags.iter())
        .filter(|t| t.as_str() != ALL_TAG)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tags with the number of posts carrying each, most used first
pub fn tag_counts(posts: &[PostSummary]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = collect_tags(posts)
        .into_iter()
        .map(|tag| {
            let count = posts.iter().filter(|p| p.has_tag(&tag)).count();
            (tag, count)
        })
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, excerpt: &str, category: &str, tags: &[&str]) -> PostSummary {
        PostSummary {
            title: title.to_string(),
            date: "2024-01-01".to_string(),
            excerpt: excerpt.to_string(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            file: format!("{}.md", title.to_lowercase()),
        }
    }

    fn sample() -> Vec<PostSummary> {
        vec![
            post("Rust Notes", "ownership", "dev", &["rust", "Lang"]),
            post("Travel", "a trip to Busan", "life", &["trip"]),
            post("Async", "futures FOO bar", "", &["rust"]),
            post("Cooking", "pasta", "Foodie", &[]),
        ]
    }

    fn titles(posts: &[PostSummary]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_all_without_search_returns_everything() {
        let posts = sample();
        assert_eq!(compute_visible(&posts, ALL_TAG, ""), posts);
        assert_eq!(compute_visible(&posts, ALL_TAG, "   "), posts);
    }

    #[test]
    fn test_tag_filter_is_exact_and_ordered() {
        let posts = sample();
        assert_eq!(
            titles(&compute_visible(&posts, "rust", "")),
            vec!["Rust Notes", "Async"]
        );
        assert!(compute_visible(&posts, "Rust", "").is_empty());
        assert!(compute_visible(&posts, "lang", "").is_empty());
        assert!(compute_visible(&posts, "nope", "").is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_over_fields() {
        let posts = sample();
        // excerpt
        assert_eq!(titles(&compute_visible(&posts, ALL_TAG, "foo")), vec!["Async", "Cooking"]);
        // category and excerpt
        assert_eq!(titles(&compute_visible(&posts, ALL_TAG, "FOO")), vec!["Async", "Cooking"]);
        // title
        assert_eq!(titles(&compute_visible(&posts, ALL_TAG, "travel")), vec!["Travel"]);
        // tag substring
        assert_eq!(titles(&compute_visible(&posts, ALL_TAG, "ang")), vec!["Rust Notes"]);
    }

    #[test]
    fn test_search_term_is_not_trimmed_for_matching() {
        let posts = sample();
        assert_eq!(titles(&compute_visible(&posts, ALL_TAG, "a trip")), vec!["Travel"]);
        assert!(compute_visible(&posts, ALL_TAG, " pasta ").is_empty());
    }

    #[test]
    fn test_filters_intersect() {
        let posts = sample();
        assert_eq!(titles(&compute_visible(&posts, "rust", "futures")), vec!["Async"]);
        assert!(compute_visible(&posts, "trip", "futures").is_empty());
    }

    #[test]
    fn test_empty_collection() {
        assert!(compute_visible(&[], ALL_TAG, "").is_empty());
        assert!(compute_visible(&[], "x", "y").is_empty());
    }

    #[test]
    fn test_collect_tags_sorted_and_deduplicated() {
        let mut posts = sample();
        posts.push(post("Meta", "", "", &["all", "rust", "alpha"]));
        assert_eq!(collect_tags(&posts), vec!["Lang", "alpha", "rust", "trip"]);
    }

    #[test]
    fn test_tag_counts() {
        let counts = tag_counts(&sample());
        assert_eq!(counts[0], ("rust".to_string(), 2));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_filter_state() {
        let state = FilterState::new(None, None);
        assert!(state.is_all());
        let state = FilterState::new(Some(""), Some("x"));
        assert!(state.is_all());
        assert_eq!(state.search_term, "x");
        let state = FilterState::new(Some("trip"), None);
        assert_eq!(titles(&state.visible(&sample())), vec!["Travel"]);
    }
}
