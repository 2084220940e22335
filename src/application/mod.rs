//! Application services layer.

pub mod aggregates;
pub mod error;
pub mod queries;
pub mod repos;
