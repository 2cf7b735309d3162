//! Data types flowing through the competitor discovery pipeline.

pub mod analysis;
pub mod competitor;
pub mod config;
pub mod query;
pub mod source;
