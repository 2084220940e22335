//! Snippet records mirrored from the content dataset.

use serde::{Deserialize, Serialize};

/// Type tag carried by short code snippets. Every other type counts as an article.
pub const SNIPPET_TYPE: &str = "snippet";
/// Pseudo type accepted by filters to select everything that is not a snippet.
pub const ARTICLE_TYPE: &str = "article";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetRecord {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Explicit primary tag. Falls back to the first entry of `tags` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_tag: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

impl SnippetRecord {
    pub fn primary_tag(&self) -> Option<&str> {
        self.primary_tag
            .as_deref()
            .or_else(|| self.tags.first().map(String::as_str))
    }

    pub fn language_id(&self) -> Option<&str> {
        self.language.as_ref().map(|language| language.id.as_str())
    }

    pub fn is_snippet(&self) -> bool {
        self.kind == SNIPPET_TYPE
    }

    /// Value of a groupable field, or `None` when the record does not carry it.
    pub fn field(&self, field: SnippetField) -> Option<&str> {
        match field {
            SnippetField::Type => Some(self.kind.as_str()),
            SnippetField::Cover => self.cover.as_deref(),
        }
    }
}

/// Scalar record fields the content dataset can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnippetField {
    Type,
    Cover,
}

/// Number of records referencing one cover asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverUsage {
    pub cover: String,
    pub count: usize,
}

/// Number of records carrying one type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
}
