//! Call bounded context - the call session and the bridge's inputs and ports

pub mod aggregate;
pub mod event;
pub mod ports;
pub mod value_object;

pub use aggregate::CallSession;
pub use event::{BridgeEvent, Completion, HangupRpc, NativeAction, VendorEvent};
pub use ports::{
    AppState, AudioSession, CallPorts, CallTransaction, CallUpdate, DecodedCall, DecodedMessage,
    InCallSettings, IncomingCallPresenter, LocalNotifier, MediaSession, MessageParser,
    NativeCallController, NativeCallProvider, PushPayload, VendorActiveCall, VendorCallClient,
};
pub use value_object::{CallDirection, CallStatus, EndReason, MediaKind, MessageCategory};
