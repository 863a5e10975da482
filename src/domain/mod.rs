//! Domain layer - Core call model and rules
//!
//! This layer contains:
//! - The call session aggregate and its value objects
//! - The closed set of events the bridge consumes
//! - Ports for the vendor SDK and the native call UI
//! - The push call decoder
//! - The native call handle registry

pub mod call;
pub mod push;
pub mod registry;
pub mod shared;

// Re-export commonly used types
pub use shared::{BridgeError, Result};
