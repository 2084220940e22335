//! Redirect table loading.
//!
//! The table is an ordered list of `{from, to}` pairs. YAML files hold a
//! top-level sequence; TOML files hold `[[redirects]]` tables.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::redirects::{RedirectEdge, RedirectGraph};

use super::error::InfraError;

#[derive(Debug, Deserialize)]
struct RedirectArchive {
    #[serde(default)]
    redirects: Vec<RedirectEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectFormat {
    Yaml,
    Toml,
}

impl RedirectFormat {
    fn from_path(path: &Path) -> Result<Self, InfraError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(InfraError::configuration(format!(
                "unsupported redirect file `{}` (expected .yaml, .yml or .toml)",
                path.display()
            ))),
        }
    }
}

/// Read and validate every redirect edge in `path`, keeping file order.
pub fn load_redirects(path: &Path) -> Result<Vec<RedirectEdge>, InfraError> {
    let format = RedirectFormat::from_path(path)?;
    let raw = fs::read_to_string(path).map_err(|err| InfraError::read(path, err))?;

    let edges = match format {
        RedirectFormat::Yaml => parse_yaml(&raw).map_err(|err| InfraError::parse(path, err))?,
        RedirectFormat::Toml => {
            toml::from_str::<RedirectArchive>(&raw)
                .map_err(|err| InfraError::parse(path, err))?
                .redirects
        }
    };

    for edge in &edges {
        edge.validate().map_err(|err| InfraError::invalid(path, err))?;
    }

    info!(
        path = %path.display(),
        redirects = edges.len(),
        "loaded redirect table"
    );
    Ok(edges)
}

/// Load `path` and index it for closure lookups.
pub fn load_redirect_graph(path: &Path) -> Result<RedirectGraph, InfraError> {
    load_redirects(path).map(|edges| edges.into_iter().collect())
}

fn parse_yaml(raw: &str) -> Result<Vec<RedirectEdge>, serde_yaml::Error> {
    // An empty document is an empty table.
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(raw)
}
