//! Core trait abstractions for the discovery pipeline.
//!
//! These traits define the interfaces that applications implement
//! to provide search, page fetching and language model capabilities.

pub mod fetcher;
pub mod llm;
pub mod searcher;
