//! Error types.
//!
//! Network and business failures are not errors here: the request pipeline
//! always settles with a classified [`Response`](crate::Response). These types
//! cover construction and configuration problems only.

use crate::config::Platform;
use thiserror::Error;

/// Result type for basenet operations.
pub type Result<T> = std::result::Result<T, BaseNetworkError>;

/// Errors raised while building a [`BaseNetwork`](crate::BaseNetwork) or its configuration.
#[derive(Debug, Error)]
pub enum BaseNetworkError {
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// The platform has no built-in adapter and needs a bridge.
    #[error("Platform '{0}' requires a bridge adapter, use BaseNetwork::with_adapter")]
    BridgeRequired(Platform),

    /// Unknown platform name.
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// Unknown request method name.
    #[error("Unknown request method: {0}")]
    UnknownMethod(String),

    /// Configuration could not be deserialized.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_required_names_platform() {
        let err = BaseNetworkError::BridgeRequired(Platform::Weex);
        assert!(err.to_string().contains("weex"));
    }

    #[test]
    fn test_invalid_config_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BaseNetworkError = json_err.into();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
