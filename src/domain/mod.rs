//! Domain layer types and invariants.

pub mod error;
pub mod filters;
pub mod redirects;
pub mod snippets;
