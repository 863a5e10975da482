//! Call session aggregate

use crate::domain::call::value_object::{CallDirection, CallStatus, MediaKind};
use crate::domain::shared::error::RegistryError;
use crate::domain::shared::value_objects::{CallId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized view of one remote call
///
/// The vendor backend owns the authoritative status; this is the bridge's
/// local copy. `call_id` is only present while the call is registered with
/// the native call-UI subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    session_id: SessionId,
    call_id: Option<CallId>,
    direction: CallDirection,
    status: CallStatus,
    media_kind: MediaKind,
    remote_display_name: String,
    observed_at: DateTime<Utc>,
}

impl CallSession {
    pub fn new(
        session_id: SessionId,
        direction: CallDirection,
        status: CallStatus,
        media_kind: MediaKind,
        remote_display_name: impl Into<String>,
    ) -> Self {
        Self {
            session_id,
            call_id: None,
            direction,
            status,
            media_kind,
            remote_display_name: remote_display_name.into(),
            observed_at: Utc::now(),
        }
    }

    pub fn incoming(
        session_id: impl Into<SessionId>,
        status: CallStatus,
        media_kind: MediaKind,
        remote_display_name: impl Into<String>,
    ) -> Self {
        Self::new(
            session_id.into(),
            CallDirection::Incoming,
            status,
            media_kind,
            remote_display_name,
        )
    }

    pub fn outgoing(
        session_id: impl Into<SessionId>,
        status: CallStatus,
        media_kind: MediaKind,
        remote_display_name: impl Into<String>,
    ) -> Self {
        Self::new(
            session_id.into(),
            CallDirection::Outgoing,
            status,
            media_kind,
            remote_display_name,
        )
    }

    /// Bind the native call handle. A session keeps the first handle it is given.
    pub fn attach_call_id(&mut self, call_id: CallId) -> Result<(), RegistryError> {
        match self.call_id {
            Some(existing) if existing != call_id => Err(RegistryError::AlreadyRegistered {
                call_id: existing.to_string(),
                session_id: self.session_id.to_string(),
            }),
            _ => {
                self.call_id = Some(call_id);
                Ok(())
            }
        }
    }

    /// Drop the native call handle, returning it if one was bound
    pub fn release_call_id(&mut self) -> Option<CallId> {
        self.call_id.take()
    }

    pub fn set_status(&mut self, status: CallStatus) {
        self.status = status;
    }

    /// Handle shown by the native call UI: the display name with each word capitalized
    pub fn remote_handle(&self) -> String {
        capitalize_words(&self.remote_display_name)
    }

    // Getters
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn call_id(&self) -> Option<CallId> {
        self.call_id
    }

    pub fn direction(&self) -> CallDirection {
        self.direction
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    pub fn remote_display_name(&self) -> &str {
        &self.remote_display_name
    }

    pub fn observed_at(&self) -> &DateTime<Utc> {
        &self.observed_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

fn capitalize_words(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> CallSession {
        CallSession::incoming("s1", CallStatus::Initiated, MediaKind::Audio, "alice smith")
    }

    #[test]
    fn test_new_session_has_no_handle() {
        let session = alice();
        assert_eq!(session.session_id().as_str(), "s1");
        assert_eq!(session.direction(), CallDirection::Incoming);
        assert!(session.call_id().is_none());
        assert!(!session.is_terminal());
    }

    #[test]
    fn test_attach_and_release_handle() {
        let mut session = alice();
        let call_id = CallId::new();
        session.attach_call_id(call_id).unwrap();
        assert_eq!(session.call_id(), Some(call_id));

        // Re-attaching the same handle is harmless
        session.attach_call_id(call_id).unwrap();

        // A different handle is refused
        assert!(session.attach_call_id(CallId::new()).is_err());

        assert_eq!(session.release_call_id(), Some(call_id));
        assert_eq!(session.release_call_id(), None);
    }

    #[test]
    fn test_remote_handle_capitalized() {
        assert_eq!(alice().remote_handle(), "Alice Smith");
        let session = CallSession::outgoing("s2", CallStatus::Initiated, MediaKind::Video, "BOB");
        assert_eq!(session.remote_handle(), "Bob");
        let session = CallSession::outgoing("s3", CallStatus::Initiated, MediaKind::Video, "");
        assert_eq!(session.remote_handle(), "");
    }
}
