//! Events consumed by the call lifecycle bridge
//!
//! Every input to the bridge, whether it comes from a push, the vendor SDK,
//! the native call UI or the completion of an earlier asynchronous operation,
//! is one variant of [`BridgeEvent`].

use crate::domain::call::aggregate::CallSession;
use crate::domain::call::ports::CallTransaction;
use crate::domain::shared::error::{DecodeError, NativeReportError, VendorRpcError};
use crate::domain::shared::value_objects::{CallId, SessionId};

/// Vendor SDK call listener callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum VendorEvent {
    IncomingCallAccepted(CallSession),
    IncomingCallRejected(CallSession),
    OutgoingCallAccepted(CallSession),
    OutgoingCallRejected(CallSession),
    CallEnded(CallSession),
    CallInitiated(CallSession),
}

impl VendorEvent {
    pub fn session(&self) -> &CallSession {
        match self {
            VendorEvent::IncomingCallAccepted(s)
            | VendorEvent::IncomingCallRejected(s)
            | VendorEvent::OutgoingCallAccepted(s)
            | VendorEvent::OutgoingCallRejected(s)
            | VendorEvent::CallEnded(s)
            | VendorEvent::CallInitiated(s) => s,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VendorEvent::IncomingCallAccepted(_) => "incoming_call_accepted",
            VendorEvent::IncomingCallRejected(_) => "incoming_call_rejected",
            VendorEvent::OutgoingCallAccepted(_) => "outgoing_call_accepted",
            VendorEvent::OutgoingCallRejected(_) => "outgoing_call_rejected",
            VendorEvent::CallEnded(_) => "call_ended",
            VendorEvent::CallInitiated(_) => "call_initiated",
        }
    }
}

/// Native call-UI action callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeAction {
    Answer(CallId),
    End(CallId),
    Mute { call_id: CallId, muted: bool },
    ProviderReset,
}

/// Vendor hang-up RPC issued for a native "end" action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HangupRpc {
    Reject,
    End,
}

impl HangupRpc {
    pub fn as_str(&self) -> &'static str {
        match self {
            HangupRpc::Reject => "reject_session",
            HangupRpc::End => "end_session",
        }
    }
}

/// Results of asynchronous operations, redelivered to the bridge
#[derive(Debug, Clone)]
pub enum Completion {
    NativeReport {
        call_id: CallId,
        result: Result<(), NativeReportError>,
    },
    VendorAccept {
        call_id: CallId,
        result: Result<SessionId, VendorRpcError>,
    },
    VendorHangup {
        call_id: CallId,
        rpc: HangupRpc,
        result: Result<(), VendorRpcError>,
    },
    Transaction {
        action: CallTransaction,
        result: Result<(), NativeReportError>,
    },
    Notification {
        result: Result<(), String>,
    },
}

/// Closed set of inputs dispatched through the bridge's transition function
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    PushDecoded(Result<CallSession, DecodeError>),
    Vendor(VendorEvent),
    Native(NativeAction),
    Completion(Completion),
}

impl From<VendorEvent> for BridgeEvent {
    fn from(event: VendorEvent) -> Self {
        BridgeEvent::Vendor(event)
    }
}

impl From<NativeAction> for BridgeEvent {
    fn from(action: NativeAction) -> Self {
        BridgeEvent::Native(action)
    }
}

impl From<Completion> for BridgeEvent {
    fn from(completion: Completion) -> Self {
        BridgeEvent::Completion(completion)
    }
}
