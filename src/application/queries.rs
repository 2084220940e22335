//! Memoized prepared queries used while building the site.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::cache::{CacheError, QueryCache, QueryKey};
use crate::domain::filters::SnippetFilter;
use crate::domain::redirects::RedirectGraph;
use crate::domain::snippets::{CoverUsage, SnippetRecord, TypeCount};

use super::aggregates;
use super::repos::{CoverAssets, SnippetsRepo};

/// Entry point for every prepared query of one build pass.
///
/// Results are computed from the injected collaborators on first request and
/// served from the shared [`QueryCache`] afterwards.
#[derive(Clone)]
pub struct PreparedQueries {
    cache: Arc<QueryCache>,
    snippets: Arc<dyn SnippetsRepo>,
    covers: Arc<dyn CoverAssets>,
    redirects: Arc<RedirectGraph>,
}

impl PreparedQueries {
    pub fn new(
        cache: Arc<QueryCache>,
        snippets: Arc<dyn SnippetsRepo>,
        covers: Arc<dyn CoverAssets>,
        redirects: Arc<RedirectGraph>,
    ) -> Self {
        Self {
            cache,
            snippets,
            covers,
            redirects,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cover usage counts, most used first. See [`aggregates::cover_image_usage`].
    pub fn cover_image_usage(&self) -> Result<Arc<Vec<CoverUsage>>, CacheError> {
        self.cache.get_or_compute(QueryKey::CoverImageUsage, || {
            aggregates::cover_image_usage(self.snippets.as_ref(), self.covers.cover_names())
        })
    }

    pub fn snippet_count_by_type(&self) -> Result<Arc<Vec<TypeCount>>, CacheError> {
        self.cache.get_or_compute(QueryKey::SnippetCountByType, || {
            aggregates::snippet_count_by_type(self.snippets.as_ref())
        })
    }

    /// Records matching every condition in `filter`, in store order.
    pub fn match_snippets(
        &self,
        filter: &SnippetFilter,
    ) -> Result<Arc<Vec<SnippetRecord>>, CacheError> {
        self.cache
            .get_or_compute(QueryKey::match_snippets(filter), || {
                aggregates::match_snippets(self.snippets.as_ref(), filter)
            })
    }

    /// Every slug that redirects, directly or through a chain, to `slug`.
    ///
    /// The first entry is always `slug` itself.
    pub fn page_alternative_urls(&self, slug: &str) -> Result<Arc<Vec<String>>, CacheError> {
        self.cache
            .get_or_compute(QueryKey::page_alternative_urls(slug), || {
                self.redirects.alternatives(slug)
            })
    }

    /// Precompute the parameterless aggregates at the start of a build.
    #[instrument(skip(self), target = "sitequery::queries")]
    pub fn warm(&self) -> Result<(), CacheError> {
        let covers = self.cover_image_usage()?;
        let types = self.snippet_count_by_type()?;
        info!(
            covers = covers.len(),
            types = types.len(),
            records = self.snippets.len(),
            redirects = self.redirects.edge_count(),
            "warmed prepared queries"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::application::repos::RecordGroup;
    use crate::domain::redirects::RedirectEdge;
    use crate::domain::snippets::SnippetField;
    use crate::infra::assets::CoverDirectory;
    use crate::infra::content::SnippetDataset;

    /// Counts store scans so tests can observe cache misses.
    struct CountingRepo {
        inner: SnippetDataset,
        scans: AtomicUsize,
    }

    impl SnippetsRepo for CountingRepo {
        fn len(&self) -> usize {
            self.inner.len()
        }

        fn group_by(&self, field: SnippetField) -> Vec<RecordGroup<'_>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.group_by(field)
        }

        fn filter(&self, predicate: &dyn Fn(&SnippetRecord) -> bool) -> Vec<SnippetRecord> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.filter(predicate)
        }
    }

    fn record(slug: &str, kind: &str, tags: &[&str], cover: Option<&str>) -> SnippetRecord {
        SnippetRecord {
            slug: slug.to_string(),
            title: String::new(),
            kind: kind.to_string(),
            language: None,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            primary_tag: None,
            cover: cover.map(str::to_string),
        }
    }

    fn queries() -> (PreparedQueries, Arc<CountingRepo>) {
        let repo = Arc::new(CountingRepo {
            inner: SnippetDataset::new(vec![
                record("a", "snippet", &["array", "css"], Some("x")),
                record("b", "story", &["css"], Some("x")),
                record("c", "snippet", &["css"], None),
            ]),
            scans: AtomicUsize::new(0),
        });
        let covers = CoverDirectory::from_names(vec!["x".to_string(), "y".to_string()]);
        let redirects: RedirectGraph = [RedirectEdge::new("old", "a")].into_iter().collect();

        let queries = PreparedQueries::new(
            Arc::new(QueryCache::new()),
            repo.clone(),
            Arc::new(covers),
            Arc::new(redirects),
        );
        (queries, repo)
    }

    #[test]
    fn repeated_queries_scan_the_store_once() {
        let (queries, repo) = queries();

        let first = queries.snippet_count_by_type().expect("first");
        let second = queries.snippet_count_by_type().expect("second");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.scans.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn primary_flag_does_not_share_results() {
        let (queries, repo) = queries();

        let primary = queries
            .match_snippets(&SnippetFilter::new().tag("css").primary(true))
            .expect("primary");
        let any = queries
            .match_snippets(&SnippetFilter::new().tag("css"))
            .expect("any");

        let primary: Vec<&str> = primary.iter().map(|r| r.slug.as_str()).collect();
        let any: Vec<&str> = any.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(primary, vec!["b", "c"]);
        assert_eq!(any, vec!["a", "b", "c"]);
        assert_eq!(repo.scans.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn alternative_urls_are_reference_stable() {
        let (queries, _) = queries();

        let first = queries.page_alternative_urls("a").expect("first");
        let second = queries.page_alternative_urls("a").expect("second");

        assert_eq!(*first, vec!["a".to_string(), "old".to_string()]);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn warm_populates_aggregates() {
        let (queries, repo) = queries();

        queries.warm().expect("warm");
        assert!(queries.cache().contains(&QueryKey::CoverImageUsage));
        assert!(queries.cache().contains(&QueryKey::SnippetCountByType));

        let usage = queries.cover_image_usage().expect("usage");
        assert_eq!(usage[0].cover, "x");
        assert_eq!(usage[0].count, 2);
        assert_eq!(repo.scans.load(Ordering::SeqCst), 2);
    }
}
