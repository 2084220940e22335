//! Cover image enumeration.

use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::application::repos::CoverAssets;

use super::error::InfraError;

/// Image extensions recognised as cover assets.
pub const COVER_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp", "tif", "tiff"];

/// Cover basenames found in one asset directory.
#[derive(Debug, Clone, Default)]
pub struct CoverDirectory {
    names: Vec<String>,
}

impl CoverDirectory {
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// List the images directly inside `dir` whose extension is in `extensions`.
    ///
    /// Names are returned in file-name order with directory and extension
    /// stripped. Symlinks to files count as files, dotfiles are skipped, and
    /// a missing directory yields an empty listing.
    pub fn scan<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<Self, InfraError> {
        if !dir.is_dir() {
            warn!(
                path = %dir.display(),
                "cover asset directory does not exist; no covers enumerated"
            );
            return Ok(Self::default());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(dir).to_path_buf();
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                InfraError::read(&path, source)
            })?;

            let Some(file_name) = entry.file_name().to_str() else {
                warn!(
                    path = %entry.path().display(),
                    "skipping cover asset with a non UTF-8 name"
                );
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            // resolves symlinks; dangling links are not files
            let path = entry.path();
            if !path.is_file() || !has_extension(path, extensions) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_owned());
            }
        }

        info!(path = %dir.display(), covers = names.len(), "enumerated cover assets");
        Ok(Self { names })
    }
}

impl CoverAssets for CoverDirectory {
    fn cover_names(&self) -> &[String] {
        &self.names
    }
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
}
