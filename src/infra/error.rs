use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse `{}`: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid content in `{}`: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn invalid(path: &Path, source: DomainError) -> Self {
        Self::Invalid {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
