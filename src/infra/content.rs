//! In-memory snippet dataset loaded from the content build output.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::application::repos::{RecordGroup, SnippetsRepo};
use crate::domain::snippets::{SnippetField, SnippetRecord};

use super::error::InfraError;

/// Snippet records held in file order.
#[derive(Debug, Clone, Default)]
pub struct SnippetDataset {
    records: Vec<SnippetRecord>,
}

impl SnippetDataset {
    pub fn new(records: Vec<SnippetRecord>) -> Self {
        Self { records }
    }

    /// Load records from a JSON array file.
    pub fn load_json(path: &Path) -> Result<Self, InfraError> {
        let raw = fs::read_to_string(path).map_err(|err| InfraError::read(path, err))?;
        let records: Vec<SnippetRecord> =
            serde_json::from_str(&raw).map_err(|err| InfraError::parse(path, err))?;

        info!(
            path = %path.display(),
            records = records.len(),
            "loaded snippet dataset"
        );
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[SnippetRecord] {
        &self.records
    }
}

impl SnippetsRepo for SnippetDataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn group_by(&self, field: SnippetField) -> Vec<RecordGroup<'_>> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<RecordGroup<'_>> = Vec::new();

        for record in &self.records {
            let Some(key) = record.field(field) else {
                continue;
            };
            let index = *positions.entry(key).or_insert_with(|| {
                groups.push(RecordGroup {
                    key,
                    records: Vec::new(),
                });
                groups.len() - 1
            });
            groups[index].records.push(record);
        }

        groups
    }

    fn filter(&self, predicate: &dyn Fn(&SnippetRecord) -> bool) -> Vec<SnippetRecord> {
        self.records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_json(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[test]
    fn group_by_preserves_first_appearance() {
        let file = write_json(
            r#"[
                { "slug": "a", "type": "story", "cover": "sea" },
                { "slug": "b", "type": "snippet" },
                { "slug": "c", "type": "story", "cover": "sea" },
                { "slug": "d", "type": "cheatsheet", "cover": "lake" }
            ]"#,
        );
        let dataset = SnippetDataset::load_json(file.path()).expect("dataset");

        let types: Vec<(&str, usize)> = dataset
            .group_by(SnippetField::Type)
            .iter()
            .map(|group| (group.key, group.records.len()))
            .collect();
        assert_eq!(types, vec![("story", 2), ("snippet", 1), ("cheatsheet", 1)]);

        let covers: Vec<(&str, Vec<&str>)> = dataset
            .group_by(SnippetField::Cover)
            .iter()
            .map(|group| {
                (
                    group.key,
                    group.records.iter().map(|r| r.slug.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(covers, vec![("sea", vec!["a", "c"]), ("lake", vec!["d"])]);
    }

    #[test]
    fn filter_keeps_file_order() {
        let dataset = SnippetDataset::new(vec![
            serde_json::from_str(r#"{ "slug": "z", "type": "snippet" }"#).expect("z"),
            serde_json::from_str(r#"{ "slug": "y", "type": "story" }"#).expect("y"),
            serde_json::from_str(r#"{ "slug": "x", "type": "snippet" }"#).expect("x"),
        ]);

        let snippets = dataset.filter(&|record| record.is_snippet());
        let slugs: Vec<&str> = snippets.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["z", "x"]);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_json(r#"{ "not": "an array" }"#);

        let err = SnippetDataset::load_json(file.path()).expect_err("should fail");
        assert!(matches!(err, InfraError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = SnippetDataset::load_json(Path::new("/nonexistent/snippets.json"))
            .expect_err("should fail");
        assert!(matches!(err, InfraError::Read { .. }));
    }
}
