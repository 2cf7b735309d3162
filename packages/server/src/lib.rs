// Competitor Scout - API server
//
// HTTP front end and CLI for the competitor discovery pipeline.
// The pipeline itself lives in the competitor-scout crate.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
