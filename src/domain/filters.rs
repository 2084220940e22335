//! Snippet filter specifications and the predicates they expand into.
//!
//! A [`SnippetFilter`] names up to three independent conditions. Each supplied
//! condition becomes one [`SnippetMatcher`]; a record matches the filter when
//! it satisfies every matcher.

use serde::{Deserialize, Serialize};

use super::snippets::{ARTICLE_TYPE, SnippetRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetFilter {
    pub language: Option<String>,
    pub tag: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Match `tag` against the primary tag only instead of the full tag list.
    pub primary: bool,
}

impl SnippetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Drop empty-string options so that filters with the same meaning compare equal.
    pub fn normalized(&self) -> Self {
        Self {
            language: non_empty(&self.language).map(str::to_owned),
            tag: non_empty(&self.tag).map(str::to_owned),
            kind: non_empty(&self.kind).map(str::to_owned),
            primary: self.primary,
        }
    }

    /// Expand into matchers in evaluation order: type, language, tag.
    pub fn matchers(&self) -> Vec<SnippetMatcher> {
        let mut matchers = Vec::with_capacity(3);

        if let Some(kind) = non_empty(&self.kind) {
            matchers.push(SnippetMatcher::Type(TypeMatcher::from_filter_value(kind)));
        }
        if let Some(language) = non_empty(&self.language) {
            matchers.push(SnippetMatcher::Language(language.to_owned()));
        }
        if let Some(tag) = non_empty(&self.tag) {
            matchers.push(SnippetMatcher::Tag {
                tag: tag.to_owned(),
                primary: self.primary,
            });
        }

        matchers
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMatcher {
    /// Everything that is not a snippet.
    Articles,
    Exact(String),
}

impl TypeMatcher {
    fn from_filter_value(value: &str) -> Self {
        if value == ARTICLE_TYPE {
            TypeMatcher::Articles
        } else {
            TypeMatcher::Exact(value.to_owned())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetMatcher {
    Type(TypeMatcher),
    Language(String),
    Tag { tag: String, primary: bool },
}

impl SnippetMatcher {
    pub fn matches(&self, record: &SnippetRecord) -> bool {
        match self {
            SnippetMatcher::Type(TypeMatcher::Articles) => !record.is_snippet(),
            SnippetMatcher::Type(TypeMatcher::Exact(kind)) => record.kind == *kind,
            SnippetMatcher::Language(id) => record.language_id() == Some(id.as_str()),
            SnippetMatcher::Tag { tag, primary: true } => record.primary_tag() == Some(tag.as_str()),
            SnippetMatcher::Tag {
                tag,
                primary: false,
            } => record.tags.iter().any(|candidate| candidate == tag),
        }
    }
}

/// Conjunction of `matchers`; an empty list matches every record.
pub fn matches_all(matchers: &[SnippetMatcher], record: &SnippetRecord) -> bool {
    matchers.iter().all(|matcher| matcher.matches(record))
}
