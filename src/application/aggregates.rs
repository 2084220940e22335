//! Aggregate and filter query builders over the snippet store.
//!
//! These functions do the actual work behind the prepared queries. They are
//! pure over their inputs; memoization happens one layer up.

use std::collections::HashMap;

use crate::domain::filters::{SnippetFilter, matches_all};
use crate::domain::snippets::{CoverUsage, SnippetField, SnippetRecord, TypeCount};

use super::repos::SnippetsRepo;

/// Usage count for every enumerated cover, most used first.
///
/// Covers nobody references are reported with a count of zero. Records that
/// reference a cover missing from `covers` are not reported at all. Ties keep
/// the enumeration order.
pub fn cover_image_usage(snippets: &dyn SnippetsRepo, covers: &[String]) -> Vec<CoverUsage> {
    let counts: HashMap<&str, usize> = snippets
        .group_by(SnippetField::Cover)
        .into_iter()
        .map(|group| (group.key, group.records.len()))
        .collect();

    let mut usage: Vec<CoverUsage> = covers
        .iter()
        .map(|cover| CoverUsage {
            cover: cover.clone(),
            count: counts.get(cover.as_str()).copied().unwrap_or(0),
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count));
    usage
}

/// Record count for every type present in the store, in order of first appearance.
pub fn snippet_count_by_type(snippets: &dyn SnippetsRepo) -> Vec<TypeCount> {
    snippets
        .group_by(SnippetField::Type)
        .into_iter()
        .map(|group| TypeCount {
            kind: group.key.to_owned(),
            count: group.records.len(),
        })
        .collect()
}

/// Records satisfying every condition of `filter`, in store order.
pub fn match_snippets(snippets: &dyn SnippetsRepo, filter: &SnippetFilter) -> Vec<SnippetRecord> {
    let matchers = filter.matchers();
    snippets.filter(&|record| matches_all(&matchers, record))
}
