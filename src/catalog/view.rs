//! Derived-view filtering and sorting over a catalog snapshot.
//!
//! This is the pure counterpart of the browse and management screens: no
//! I/O, no caching, recomputed from scratch on every call. Two search
//! semantics are deliberately kept apart rather than unified, because the
//! surfaces they serve behave differently (see [`SearchMode`]).

use super::schema::{Category, ContentItem, ContentKind, SortOrder};
use chrono::NaiveDate;

/// How free-text search matches an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Primary search box: any whitespace-delimited word of the title
    /// starts with the query.
    #[default]
    TitleWordPrefix,
    /// Management table: the query appears as a substring of the title,
    /// description, category, or type.
    AnyFieldSubstring,
}

/// Filter state for one recomputation.
#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    pub search: String,
    pub mode: SearchMode,
    /// `None` means the "All" selector.
    pub category: Option<Category>,
    /// `None` means the "All" selector.
    pub kind: Option<ContentKind>,
    /// Exact calendar-day match on createdAt when set.
    pub day: Option<NaiveDate>,
    pub sort: SortOrder,
}

/// Narrow and order a catalog snapshot for display. Items that pass every
/// predicate keep their input order relative to equal-timestamp peers.
pub fn derive(items: &[ContentItem], query: &ViewQuery) -> Vec<ContentItem> {
    let needle = query.search.trim().to_lowercase();
    let mut out: Vec<ContentItem> = items
        .iter()
        .filter(|item| matches_search(item, &needle, query.mode))
        .filter(|item| query.category.is_none_or(|c| item.category == c))
        .filter(|item| query.kind.is_none_or(|k| item.kind == k))
        .filter(|item| query.day.is_none_or(|d| item.created_at.date_naive() == d))
        .cloned()
        .collect();

    match query.sort {
        SortOrder::Latest => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => out.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    out
}

fn matches_search(item: &ContentItem, needle: &str, mode: SearchMode) -> bool {
    if needle.is_empty() {
        return true;
    }
    match mode {
        SearchMode::TitleWordPrefix => item
            .title
            .split_whitespace()
            .any(|word| word.to_lowercase().starts_with(needle)),
        SearchMode::AnyFieldSubstring => {
            item.title.to_lowercase().contains(needle)
                || item
                    .description
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(needle)
                || item.category.as_str().to_lowercase().contains(needle)
                || item.kind.as_str().to_lowercase().contains(needle)
        }
    }
}
