//! Crate result type

use super::error::BridgeError;

/// Standard result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
