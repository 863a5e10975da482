//! Shared kernel - Common types used across the call bridge

pub mod error;
pub mod result;
pub mod value_objects;

pub use error::{BridgeError, ConfigError, DecodeError, NativeReportError, RegistryError, VendorRpcError};
pub use result::Result;
pub use value_objects::*;
