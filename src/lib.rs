// basenet - A cross-platform HTTP request facade for Rust
//
// This library puts one request API over web, mini-program and stream
// runtimes, with business-error detection, error reporting and retry.

// Re-export the client
pub use basenet_client::*;

// Re-export common dependencies
pub use async_trait::async_trait;
pub use serde_json::{Value, json};

/// Prelude for common imports.
///
/// ```
/// use basenet::prelude::*;
/// ```
pub mod prelude {
    pub use basenet_client::prelude::*;
    pub use serde_json::{Value, json};
}
