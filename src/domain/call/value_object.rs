//! Call value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Call direction, relative to the local user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

/// Media kind negotiated for the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Audio,
    Video,
}

impl MediaKind {
    /// Parse the vendor's call type; anything that is not video is treated as audio
    pub fn from_vendor(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("video") {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }

    pub fn has_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

/// Call status as reported by the vendor, normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    Initiated,
    Ringing,
    Ongoing,
    Rejected,
    Busy,
    Cancelled,
    Unanswered,
    Ended,
    Unknown,
}

impl CallStatus {
    /// Parse a vendor status string. Unrecognized values map to `Unknown`.
    pub fn from_vendor(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "initiated" => CallStatus::Initiated,
            "ringing" => CallStatus::Ringing,
            "ongoing" => CallStatus::Ongoing,
            "rejected" => CallStatus::Rejected,
            "busy" => CallStatus::Busy,
            "cancelled" | "canceled" => CallStatus::Cancelled,
            "unanswered" => CallStatus::Unanswered,
            "ended" => CallStatus::Ended,
            _ => CallStatus::Unknown,
        }
    }

    /// No further progress is possible once a call reaches a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallStatus::Rejected
                | CallStatus::Busy
                | CallStatus::Cancelled
                | CallStatus::Unanswered
                | CallStatus::Ended
                | CallStatus::Unknown
        )
    }

    /// Native end reason for a terminal status
    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            CallStatus::Unanswered | CallStatus::Rejected | CallStatus::Busy => {
                Some(EndReason::Unanswered)
            }
            CallStatus::Cancelled => Some(EndReason::Failed),
            CallStatus::Ended | CallStatus::Unknown => Some(EndReason::RemoteEnded),
            CallStatus::Initiated | CallStatus::Ringing | CallStatus::Ongoing => None,
        }
    }

    /// The caller gave up before we picked up
    pub fn is_missed(&self) -> bool {
        matches!(self, CallStatus::Unanswered | CallStatus::Cancelled)
    }
}

/// Reason handed to the native call-UI subsystem when a call ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Failed,
    RemoteEnded,
    Unanswered,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Failed => "failed",
            EndReason::RemoteEnded => "remote_ended",
            EndReason::Unanswered => "unanswered",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a vendor message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    Call,
    Message,
    Action,
    Custom,
    Other(String),
}

impl MessageCategory {
    pub fn from_vendor(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "call" => MessageCategory::Call,
            "message" => MessageCategory::Message,
            "action" => MessageCategory::Action,
            "custom" => MessageCategory::Custom,
            other => MessageCategory::Other(other.to_string()),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, MessageCategory::Call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(CallStatus::from_vendor("initiated"), CallStatus::Initiated);
        assert_eq!(CallStatus::from_vendor("Cancelled"), CallStatus::Cancelled);
        assert_eq!(CallStatus::from_vendor("UNANSWERED"), CallStatus::Unanswered);
        assert_eq!(CallStatus::from_vendor("transferred"), CallStatus::Unknown);
    }

    #[test]
    fn test_end_reason_mapping() {
        assert_eq!(CallStatus::Unanswered.end_reason(), Some(EndReason::Unanswered));
        assert_eq!(CallStatus::Rejected.end_reason(), Some(EndReason::Unanswered));
        assert_eq!(CallStatus::Busy.end_reason(), Some(EndReason::Unanswered));
        assert_eq!(CallStatus::Cancelled.end_reason(), Some(EndReason::Failed));
        assert_eq!(CallStatus::Ended.end_reason(), Some(EndReason::RemoteEnded));
        assert_eq!(CallStatus::Unknown.end_reason(), Some(EndReason::RemoteEnded));
        assert_eq!(CallStatus::Initiated.end_reason(), None);
        assert_eq!(CallStatus::Ongoing.end_reason(), None);
    }

    #[test]
    fn test_terminal_statuses_have_reasons() {
        let all = [
            CallStatus::Initiated,
            CallStatus::Ringing,
            CallStatus::Ongoing,
            CallStatus::Rejected,
            CallStatus::Busy,
            CallStatus::Cancelled,
            CallStatus::Unanswered,
            CallStatus::Ended,
            CallStatus::Unknown,
        ];
        for status in all {
            assert_eq!(status.is_terminal(), status.end_reason().is_some(), "{:?}", status);
        }
    }

    #[test]
    fn test_missed_statuses() {
        assert!(CallStatus::Unanswered.is_missed());
        assert!(CallStatus::Cancelled.is_missed());
        assert!(!CallStatus::Rejected.is_missed());
        assert!(!CallStatus::Ended.is_missed());
    }

    #[test]
    fn test_category_and_media() {
        assert!(MessageCategory::from_vendor("call").is_call());
        assert_eq!(
            MessageCategory::from_vendor("interactive"),
            MessageCategory::Other("interactive".to_string())
        );
        assert!(MediaKind::from_vendor("video").has_video());
        assert!(!MediaKind::from_vendor("audio").has_video());
    }
}
