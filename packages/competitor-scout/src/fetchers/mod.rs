//! Content fetcher implementations.

mod jina;

pub use jina::{extract_title, JinaReader, DEFAULT_JINA_READER_URL};
