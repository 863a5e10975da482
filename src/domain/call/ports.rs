//! Collaborator ports
//!
//! The bridge never talks to the vendor SDK or the operating system directly.
//! These traits are defined in the domain layer (ports) and implemented in the
//! infrastructure layer (adapters), or by test doubles.

use crate::domain::call::aggregate::CallSession;
use crate::domain::call::value_object::{CallStatus, EndReason, MediaKind, MessageCategory};
use crate::domain::shared::error::{NativeReportError, VendorRpcError};
use crate::domain::shared::value_objects::{CallId, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Untyped push payload as delivered by the push transport
pub type PushPayload = serde_json::Map<String, serde_json::Value>;

/// Call fields of a parsed vendor message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    pub session_id: SessionId,
    pub status: CallStatus,
    pub media_kind: MediaKind,
    pub sender_display_name: Option<String>,
    pub receiver_display_name: Option<String>,
}

/// Result of the vendor's structural message parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMessage {
    Call(DecodedCall),
    Other(MessageCategory),
}

impl DecodedMessage {
    pub fn category(&self) -> MessageCategory {
        match self {
            DecodedMessage::Call(_) => MessageCategory::Call,
            DecodedMessage::Other(category) => category.clone(),
        }
    }
}

/// Vendor message parser
#[cfg_attr(test, mockall::automock)]
pub trait MessageParser: Send + Sync {
    /// Parse the embedded `message` object of a push payload
    fn parse(&self, raw: &serde_json::Value) -> Result<DecodedMessage, String>;
}

/// The vendor's view of the call currently in progress on this device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorActiveCall {
    pub session_id: SessionId,
    pub status: CallStatus,
    pub initiated_by_local_user: bool,
}

/// Vendor session RPCs
#[async_trait]
pub trait VendorCallClient: Send + Sync {
    async fn accept_session(&self, session_id: &SessionId) -> Result<CallSession, VendorRpcError>;

    async fn reject_session(
        &self,
        session_id: &SessionId,
        status: CallStatus,
    ) -> Result<(), VendorRpcError>;

    async fn end_session(&self, session_id: &SessionId) -> Result<(), VendorRpcError>;

    /// Call the vendor SDK currently considers active, if any
    fn active_call(&self) -> Option<VendorActiveCall>;
}

/// Payload of a native incoming-call report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallUpdate {
    pub remote_handle: String,
    pub has_video: bool,
}

/// Native call-UI subsystem (the provider side)
#[async_trait]
pub trait NativeCallProvider: Send + Sync {
    async fn report_incoming_call(
        &self,
        call_id: CallId,
        update: CallUpdate,
    ) -> Result<(), NativeReportError>;

    fn report_call_ended(&self, call_id: CallId, ended_at: DateTime<Utc>, reason: EndReason);
}

/// Actions requested through the native call controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTransaction {
    Start { call_id: CallId, handle: String },
    Answer(CallId),
    End(CallId),
}

impl CallTransaction {
    pub fn call_id(&self) -> CallId {
        match self {
            CallTransaction::Start { call_id, .. } => *call_id,
            CallTransaction::Answer(call_id) | CallTransaction::End(call_id) => *call_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CallTransaction::Start { .. } => "start",
            CallTransaction::Answer(_) => "answer",
            CallTransaction::End(_) => "end",
        }
    }
}

/// Native call controller
#[async_trait]
pub trait NativeCallController: Send + Sync {
    async fn request_transaction(&self, action: CallTransaction) -> Result<(), NativeReportError>;
}

/// Shared audio session of the device
pub trait AudioSession: Send + Sync {
    /// Play-and-record, mixing with others, bluetooth allowed, speaker by default
    fn configure_for_call(&self) -> Result<(), String>;
}

/// Media session owned by the vendor calls SDK
pub trait MediaSession: Send + Sync {
    fn set_audio_muted(&self, muted: bool);
    fn end_session(&self);
}

/// Local notification scheduler
#[async_trait]
pub trait LocalNotifier: Send + Sync {
    async fn schedule_notification(&self, title: String, body: String) -> Result<(), String>;
}

/// Settings of the in-call surface shown after an incoming call is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InCallSettings {
    pub audio_only: bool,
    pub switch_camera_disabled: bool,
    pub show_recording_button: bool,
    pub enable_video_tile_click: bool,
    pub enable_draggable_video_tile: bool,
}

impl Default for InCallSettings {
    fn default() -> Self {
        Self {
            audio_only: true,
            switch_camera_disabled: true,
            show_recording_button: false,
            enable_video_tile_click: false,
            enable_draggable_video_tile: false,
        }
    }
}

/// Presents and dismisses the in-call UI surface
pub trait IncomingCallPresenter: Send + Sync {
    fn present(&self, session_id: &SessionId, settings: &InCallSettings);
    fn dismiss(&self);
    /// Refresh whatever view sits under the dismissed surface
    fn refresh(&self);
}

/// Application lifecycle probe
pub trait AppState: Send + Sync {
    fn is_foreground(&self) -> bool;
}

/// Every collaborator the bridge drives
#[derive(Clone)]
pub struct CallPorts {
    pub vendor: Arc<dyn VendorCallClient>,
    pub provider: Arc<dyn NativeCallProvider>,
    pub controller: Arc<dyn NativeCallController>,
    pub audio: Arc<dyn AudioSession>,
    pub media: Arc<dyn MediaSession>,
    pub notifier: Arc<dyn LocalNotifier>,
    pub presenter: Arc<dyn IncomingCallPresenter>,
    pub app_state: Arc<dyn AppState>,
}
