//! Native call handle registry
//!
//! Single source of truth for "does the OS currently think a call is active".
//! Holds at most one `(CallId, SessionId)` pair. The registry is owned by the
//! bridge, so every mutation is serialized by `&mut self`.

use crate::domain::shared::error::RegistryError;
use crate::domain::shared::value_objects::{CallId, SessionId};
use tracing::debug;

/// A call registered with the native call-UI subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredCall {
    pub call_id: CallId,
    pub session_id: SessionId,
}

#[derive(Debug, Default)]
pub struct NativeCallHandleRegistry {
    slot: Option<RegisteredCall>,
}

impl NativeCallHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and hand out a fresh call handle
    ///
    /// Registering the session that already holds the slot returns its
    /// existing handle. A different session is refused until the slot is cleared.
    pub fn register(&mut self, session_id: &SessionId) -> Result<CallId, RegistryError> {
        if let Some(existing) = &self.slot {
            if &existing.session_id == session_id {
                return Ok(existing.call_id);
            }
            return Err(RegistryError::AlreadyRegistered {
                call_id: existing.call_id.to_string(),
                session_id: existing.session_id.to_string(),
            });
        }

        let call_id = CallId::new();
        debug!(%call_id, %session_id, "Registered native call handle");
        self.slot = Some(RegisteredCall {
            call_id,
            session_id: session_id.clone(),
        });
        Ok(call_id)
    }

    pub fn current(&self) -> Option<&RegisteredCall> {
        self.slot.as_ref()
    }

    pub fn is_registered(&self, call_id: CallId) -> bool {
        matches!(&self.slot, Some(registered) if registered.call_id == call_id)
    }

    /// Clear the slot. Idempotent; returns the pair that was held, if any.
    pub fn clear(&mut self) -> Option<RegisteredCall> {
        let cleared = self.slot.take();
        if let Some(registered) = &cleared {
            debug!(call_id = %registered.call_id, session_id = %registered.session_id, "Cleared native call handle");
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_current() {
        let mut registry = NativeCallHandleRegistry::new();
        let session_id = SessionId::from("s1");
        let call_id = registry.register(&session_id).unwrap();

        let current = registry.current().unwrap();
        assert_eq!(current.call_id, call_id);
        assert_eq!(current.session_id, session_id);
        assert!(registry.is_registered(call_id));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut registry = NativeCallHandleRegistry::new();
        let call_id = registry.register(&SessionId::from("s1")).unwrap();

        assert_eq!(registry.clear().map(|r| r.call_id), Some(call_id));
        assert!(registry.current().is_none());
        assert!(registry.clear().is_none());
        assert!(!registry.is_registered(call_id));
    }

    #[test]
    fn test_register_same_session_reuses_handle() {
        let mut registry = NativeCallHandleRegistry::new();
        let session_id = SessionId::from("s1");
        let first = registry.register(&session_id).unwrap();
        let second = registry.register(&session_id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_register_other_session_refused() {
        let mut registry = NativeCallHandleRegistry::new();
        registry.register(&SessionId::from("s1")).unwrap();

        let err = registry.register(&SessionId::from("s2")).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::AlreadyRegistered { ref session_id, .. } if session_id == "s1"
        ));
        assert_eq!(registry.current().unwrap().session_id.as_str(), "s1");
    }

    #[test]
    fn test_handles_never_reused_across_sessions() {
        let mut registry = NativeCallHandleRegistry::new();
        let first = registry.register(&SessionId::from("s1")).unwrap();
        registry.clear();
        let second = registry.register(&SessionId::from("s2")).unwrap();
        assert_ne!(first, second);
    }
}
