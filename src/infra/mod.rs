//! Infrastructure adapters and runtime bootstrap.

pub mod assets;
pub mod content;
pub mod error;
pub mod redirects;
pub mod telemetry;
