//! RingBridge - call lifecycle bridge between a vendor calling SDK and a
//! native call UI
//!
//! Push notifications, vendor SDK call events and native call-UI actions are
//! serialized onto one actor that keeps a single native call handle in sync
//! with the vendor's call session.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use domain::shared::error::BridgeError;
pub use domain::shared::result::Result;
