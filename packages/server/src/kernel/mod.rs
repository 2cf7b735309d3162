// Pipeline wiring shared by the HTTP server and the CLI
pub mod deps;

pub use deps::*;
