//! Redirect edges and the reverse redirect graph.
//!
//! Edges point from a legacy slug to its canonical replacement. The graph is
//! indexed by target so that every slug resolving to a page can be collected
//! with a single breadth-first walk, even when the redirect table contains
//! cycles.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEdge {
    pub from: String,
    pub to: String,
}

impl RedirectEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.from.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "redirect to `{}` has an empty source slug",
                self.to
            )));
        }
        if self.to.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "redirect from `{}` has an empty target slug",
                self.from
            )));
        }
        Ok(())
    }
}

/// Redirect table indexed by target slug.
#[derive(Debug, Clone, Default)]
pub struct RedirectGraph {
    // to -> [from], in table order
    predecessors: HashMap<String, Vec<String>>,
    edge_count: usize,
}

impl RedirectGraph {
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Slugs redirecting directly to `slug`.
    pub fn predecessors(&self, slug: &str) -> &[String] {
        self.predecessors
            .get(slug)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every slug whose redirect chain ends at `slug`, starting with `slug` itself.
    ///
    /// Slugs are returned in breadth-first discovery order. A slug is marked
    /// visited before it is queued, so it is queued at most once.
    pub fn alternatives(&self, slug: &str) -> Vec<String> {
        let mut discovered = vec![slug.to_owned()];
        let mut visited: HashSet<&str> = HashSet::from([slug]);
        let mut queue: VecDeque<&str> = VecDeque::from([slug]);

        while let Some(current) = queue.pop_front() {
            for from in self.predecessors(current) {
                if visited.insert(from.as_str()) {
                    discovered.push(from.clone());
                    queue.push_back(from.as_str());
                }
            }
        }

        discovered
    }
}

impl FromIterator<RedirectEdge> for RedirectGraph {
    fn from_iter<I: IntoIterator<Item = RedirectEdge>>(iter: I) -> Self {
        let mut graph = Self::default();
        for RedirectEdge { from, to } in iter {
            graph.predecessors.entry(to).or_default().push(from);
            graph.edge_count += 1;
        }
        graph
    }
}
