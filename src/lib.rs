//! Memoized read-side queries over a static site's content corpus.
//!
//! The crate answers aggregate and filtered questions about snippet records
//! and resolves legacy redirect chains, computing each distinct query once
//! per build pass.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
