//! Query cache for a single build pass.
//!
//! Every prepared query is computed at most once per [`QueryCache`]. Entries
//! are keyed by [`QueryKey`], a structured key carrying the query name and
//! all of its parameters, and live as long as the cache itself:
//!
//! - no expiry or eviction
//! - no invalidation (content is immutable during a build)
//! - no persistence across runs
//!
//! The cache is created by whoever drives the build and injected into
//! [`crate::application::queries::PreparedQueries`].

mod keys;
mod lock;
mod store;

pub use keys::QueryKey;
pub use store::{CacheError, CacheStats, QueryCache};
