//! Error taxonomy for the call bridge

use thiserror::Error;

/// Failure to turn a push payload into a call session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Push payload has no embedded message")]
    MissingMessage,

    #[error("Vendor message parser failed: {0}")]
    VendorParseFailure(String),

    /// Valid vendor message of another category. Not an error for callers.
    #[error("Push payload is not a call message")]
    NotACall,
}

impl DecodeError {
    /// Whether this outcome means "not my event" rather than a malformed call
    pub fn is_not_a_call(&self) -> bool {
        matches!(self, DecodeError::NotACall)
    }
}

/// Registry slot conflicts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Call handle {call_id} already registered for session {session_id}")]
    AlreadyRegistered { call_id: String, session_id: String },
}

/// Error reported by a vendor session RPC
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Vendor RPC failed: {message}")]
pub struct VendorRpcError {
    pub code: Option<String>,
    pub message: String,
}

impl VendorRpcError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Error reported by the native call-UI subsystem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Native call subsystem error: {0}")]
pub struct NativeReportError(pub String);

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    VendorRpc(#[from] VendorRpcError),

    #[error(transparent)]
    NativeReport(#[from] NativeReportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Bridge inbox closed")]
    InboxClosed,
}
