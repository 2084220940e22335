//! Cache key definitions.

use std::fmt;

use crate::domain::filters::SnippetFilter;

/// Identifies one prepared query together with its parameters.
///
/// Parameters are kept as structured values rather than joined strings, so a
/// parameter containing any delimiter cannot collide with another key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    // Singletons
    CoverImageUsage,
    SnippetCountByType,

    // Parameterized
    MatchSnippets(SnippetFilter),
    PageAlternativeUrls(String),
}

impl QueryKey {
    /// Key for a snippet filter. Empty-string options collapse to `None`.
    pub fn match_snippets(filter: &SnippetFilter) -> Self {
        Self::MatchSnippets(filter.normalized())
    }

    pub fn page_alternative_urls(slug: impl Into<String>) -> Self {
        Self::PageAlternativeUrls(slug.into())
    }

    /// Stable query name used for metric labels and log fields.
    pub fn name(&self) -> &'static str {
        match self {
            QueryKey::CoverImageUsage => "cover_image_usage",
            QueryKey::SnippetCountByType => "snippet_count_by_type",
            QueryKey::MatchSnippets(_) => "match_snippets",
            QueryKey::PageAlternativeUrls(_) => "page_alternative_urls",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::CoverImageUsage | QueryKey::SnippetCountByType => f.write_str(self.name()),
            QueryKey::MatchSnippets(filter) => write!(
                f,
                "{}#language={:?},tag={:?},type={:?},primary={}",
                self.name(),
                filter.language,
                filter.tag,
                filter.kind,
                filter.primary
            ),
            QueryKey::PageAlternativeUrls(slug) => write!(f, "{}#{slug:?}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn equal_filters_produce_equal_keys() {
        let first = QueryKey::match_snippets(&SnippetFilter::new().tag("css").language("css"));
        let second = QueryKey::match_snippets(&SnippetFilter::new().language("css").tag("css"));
        assert_eq!(first, second);
    }

    #[test]
    fn primary_flag_is_part_of_the_key() {
        let primary = QueryKey::match_snippets(&SnippetFilter::new().tag("x").primary(true));
        let any = QueryKey::match_snippets(&SnippetFilter::new().tag("x").primary(false));
        assert_ne!(primary, any);
    }

    #[test]
    fn parameters_cannot_collide_through_delimiters() {
        // A joined `language-tag-type` string would render both of these as `a-b-c-...`.
        let first = QueryKey::match_snippets(&SnippetFilter::new().language("a-b").tag("c"));
        let second = QueryKey::match_snippets(&SnippetFilter::new().language("a").tag("b-c"));
        assert_ne!(first, second);

        let keys: HashSet<QueryKey> = [
            QueryKey::CoverImageUsage,
            QueryKey::SnippetCountByType,
            first,
            second,
            QueryKey::page_alternative_urls("/js/s/bifurcate-by"),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn empty_options_normalize_to_absent() {
        let blank = SnippetFilter {
            tag: Some(String::new()),
            ..SnippetFilter::default()
        };
        assert_eq!(
            QueryKey::match_snippets(&blank),
            QueryKey::match_snippets(&SnippetFilter::new())
        );
    }

    #[test]
    fn display_includes_every_parameter() {
        let key = QueryKey::match_snippets(&SnippetFilter::new().tag("css").primary(true));
        assert_eq!(
            key.to_string(),
            r#"match_snippets#language=None,tag=Some("css"),type=None,primary=true"#
        );
        assert_eq!(
            QueryKey::page_alternative_urls("/a").to_string(),
            r#"page_alternative_urls#"/a""#
        );
    }
}
