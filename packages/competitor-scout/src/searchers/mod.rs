//! Web searcher implementations.

mod anspire;

pub use anspire::{AnspireSearcher, DEFAULT_ANSPIRE_URL};
