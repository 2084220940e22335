//! Read-only ports onto the loaded content dataset.

use crate::domain::snippets::{SnippetField, SnippetRecord};

/// Records sharing one value of a grouped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGroup<'a> {
    pub key: &'a str,
    pub records: Vec<&'a SnippetRecord>,
}

/// Snippet records as held by the content dataset.
pub trait SnippetsRepo: Send + Sync {
    /// Number of records in the store.
    fn len(&self) -> usize;

    /// Group records by `field`, in order of first appearance.
    ///
    /// Records that do not carry the field are left out.
    fn group_by(&self, field: SnippetField) -> Vec<RecordGroup<'_>>;

    /// Records satisfying `predicate`, in store order.
    fn filter(&self, predicate: &dyn Fn(&SnippetRecord) -> bool) -> Vec<SnippetRecord>;
}

/// Basenames of the cover images available to the site.
pub trait CoverAssets: Send + Sync {
    /// Cover names without directory or extension, in enumeration order.
    fn cover_names(&self) -> &[String];
}
