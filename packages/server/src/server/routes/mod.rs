// HTTP routes
pub mod analyze;
pub mod health;
pub mod stream;

pub use analyze::*;
pub use health::*;
pub use stream::*;
