//! Recording fakes for the bridge's collaborator ports
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ringbridge::application::bridge::BridgeInbox;
use ringbridge::application::{
    bridge_channel, BridgeHandle, BridgeSettings, BridgeState, CallLifecycleBridge,
};
use ringbridge::domain::call::{
    AppState, AudioSession, CallPorts, CallSession, CallStatus, CallTransaction, CallUpdate,
    EndReason, InCallSettings, IncomingCallPresenter, LocalNotifier, MediaKind, MediaSession,
    NativeAction, NativeCallController, NativeCallProvider, PushPayload, VendorActiveCall,
    VendorCallClient, VendorEvent,
};
use ringbridge::domain::push::PushCallDecoder;
use ringbridge::domain::registry::NativeCallHandleRegistry;
use ringbridge::domain::shared::error::{NativeReportError, VendorRpcError};
use ringbridge::domain::shared::value_objects::{CallId, SessionId};
use ringbridge::infrastructure::JsonMessageParser;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Every call made into a collaborator port
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    ReportIncoming { call_id: CallId, update: CallUpdate },
    ReportEnded { call_id: CallId, reason: EndReason },
    Accept(SessionId),
    Reject(SessionId, CallStatus),
    End(SessionId),
    Transaction(CallTransaction),
    ConfigureAudio,
    Mute(bool),
    MediaEnded,
    Notify { title: String, body: String },
    Present(SessionId, InCallSettings),
    Dismiss,
    Refresh,
}

/// One fake implementing every port, recording into a shared log
#[derive(Default)]
pub struct FakePorts {
    log: Mutex<Vec<Recorded>>,
    pub foreground: AtomicBool,
    pub fail_report: AtomicBool,
    pub fail_accept: AtomicBool,
    pub fail_hangup: AtomicBool,
    pub fail_start: AtomicBool,
    pub vendor_active: Mutex<Option<VendorActiveCall>>,
}

impl FakePorts {
    fn record(&self, call: Recorded) {
        self.log.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Recorded) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn reported_incoming(&self) -> Vec<CallUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::ReportIncoming { update, .. } => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn ended_reasons(&self) -> Vec<EndReason> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::ReportEnded { reason, .. } => Some(reason),
                _ => None,
            })
            .collect()
    }

    pub fn transactions(&self) -> Vec<CallTransaction> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Transaction(action) => Some(action),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Notify { title, body } => Some((title, body)),
                _ => None,
            })
            .collect()
    }

    pub fn accepts(&self) -> Vec<SessionId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Recorded::Accept(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn hangups(&self) -> usize {
        self.count(|c| matches!(c, Recorded::Reject(..) | Recorded::End(_)))
    }

    pub fn dismissals(&self) -> usize {
        self.count(|c| matches!(c, Recorded::Dismiss))
    }

    pub fn set_vendor_active(&self, active: Option<VendorActiveCall>) {
        *self.vendor_active.lock().unwrap() = active;
    }
}

#[async_trait]
impl VendorCallClient for FakePorts {
    async fn accept_session(&self, session_id: &SessionId) -> Result<CallSession, VendorRpcError> {
        self.record(Recorded::Accept(session_id.clone()));
        if self.fail_accept.load(Ordering::SeqCst) {
            return Err(VendorRpcError::with_code("ERR_CALL_ENDED", "session already ended"));
        }
        Ok(CallSession::incoming(
            session_id.clone(),
            CallStatus::Ongoing,
            MediaKind::Audio,
            "",
        ))
    }

    async fn reject_session(
        &self,
        session_id: &SessionId,
        status: CallStatus,
    ) -> Result<(), VendorRpcError> {
        self.record(Recorded::Reject(session_id.clone(), status));
        if self.fail_hangup.load(Ordering::SeqCst) {
            return Err(VendorRpcError::new("network unreachable"));
        }
        Ok(())
    }

    async fn end_session(&self, session_id: &SessionId) -> Result<(), VendorRpcError> {
        self.record(Recorded::End(session_id.clone()));
        if self.fail_hangup.load(Ordering::SeqCst) {
            return Err(VendorRpcError::new("network unreachable"));
        }
        Ok(())
    }

    fn active_call(&self) -> Option<VendorActiveCall> {
        self.vendor_active.lock().unwrap().clone()
    }
}

#[async_trait]
impl NativeCallProvider for FakePorts {
    async fn report_incoming_call(
        &self,
        call_id: CallId,
        update: CallUpdate,
    ) -> Result<(), NativeReportError> {
        self.record(Recorded::ReportIncoming { call_id, update });
        if self.fail_report.load(Ordering::SeqCst) {
            return Err(NativeReportError("call blocked by do-not-disturb".to_string()));
        }
        Ok(())
    }

    fn report_call_ended(&self, call_id: CallId, _ended_at: DateTime<Utc>, reason: EndReason) {
        self.record(Recorded::ReportEnded { call_id, reason });
    }
}

#[async_trait]
impl NativeCallController for FakePorts {
    async fn request_transaction(&self, action: CallTransaction) -> Result<(), NativeReportError> {
        let is_start = matches!(action, CallTransaction::Start { .. });
        self.record(Recorded::Transaction(action));
        if is_start && self.fail_start.load(Ordering::SeqCst) {
            return Err(NativeReportError("start call refused".to_string()));
        }
        Ok(())
    }
}

impl AudioSession for FakePorts {
    fn configure_for_call(&self) -> Result<(), String> {
        self.record(Recorded::ConfigureAudio);
        Ok(())
    }
}

impl MediaSession for FakePorts {
    fn set_audio_muted(&self, muted: bool) {
        self.record(Recorded::Mute(muted));
    }

    fn end_session(&self) {
        self.record(Recorded::MediaEnded);
    }
}

#[async_trait]
impl LocalNotifier for FakePorts {
    async fn schedule_notification(&self, title: String, body: String) -> Result<(), String> {
        self.record(Recorded::Notify { title, body });
        Ok(())
    }
}

impl IncomingCallPresenter for FakePorts {
    fn present(&self, session_id: &SessionId, settings: &InCallSettings) {
        self.record(Recorded::Present(session_id.clone(), settings.clone()));
    }

    fn dismiss(&self) {
        self.record(Recorded::Dismiss);
    }

    fn refresh(&self) {
        self.record(Recorded::Refresh);
    }
}

impl AppState for FakePorts {
    fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }
}

pub fn ports_for(fake: &Arc<FakePorts>) -> CallPorts {
    CallPorts {
        vendor: fake.clone(),
        provider: fake.clone(),
        controller: fake.clone(),
        audio: fake.clone(),
        media: fake.clone(),
        notifier: fake.clone(),
        presenter: fake.clone(),
        app_state: fake.clone(),
    }
}

pub fn call_push(session_id: &str, status: &str, sender: &str) -> PushPayload {
    as_payload(json!({
        "message": {
            "category": "call",
            "mediaKind": "audio",
            "sessionId": session_id,
            "status": status,
            "sender": sender
        }
    }))
}

pub fn as_payload(value: Value) -> PushPayload {
    match value {
        Value::Object(map) => map,
        other => panic!("push payload must be an object, got {other}"),
    }
}

/// A bridge wired to recording fakes, driven event by event
pub struct Harness {
    pub fake: Arc<FakePorts>,
    pub handle: BridgeHandle,
    pub inbox: BridgeInbox,
    pub bridge: CallLifecycleBridge,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(BridgeSettings::default())
    }

    pub fn with_settings(settings: BridgeSettings) -> Self {
        let fake = Arc::new(FakePorts::default());
        let decoder = PushCallDecoder::new(Arc::new(JsonMessageParser::new()));
        let (handle, inbox) = bridge_channel(decoder);
        let bridge = CallLifecycleBridge::new(
            ports_for(&fake),
            NativeCallHandleRegistry::new(),
            settings,
            &handle,
        );
        Self {
            fake,
            handle,
            inbox,
            bridge,
        }
    }

    pub async fn settle(&mut self) {
        self.bridge.settle(&mut self.inbox).await;
    }

    pub async fn push(&mut self, payload: PushPayload) {
        self.handle.deliver_push(&payload).unwrap();
        self.settle().await;
    }

    pub async fn vendor(&mut self, event: VendorEvent) {
        self.handle.vendor_event(event).unwrap();
        self.settle().await;
    }

    pub async fn native(&mut self, action: NativeAction) {
        self.handle.native_action(action).unwrap();
        self.settle().await;
    }

    pub fn state(&self) -> BridgeState {
        self.bridge.state()
    }

    pub fn call_id(&self) -> CallId {
        self.bridge
            .registry()
            .current()
            .expect("a call should be registered")
            .call_id
    }

    pub fn is_registered(&self) -> bool {
        self.bridge.registry().current().is_some()
    }

    /// Bring an incoming call to `NativeRinging`
    pub async fn ringing(&mut self, session_id: &str, sender: &str) -> CallId {
        self.push(call_push(session_id, "initiated", sender)).await;
        assert_eq!(self.state(), BridgeState::NativeRinging);
        self.call_id()
    }

    /// Bring an incoming call to `NativeActive` through a native answer
    pub async fn active(&mut self, session_id: &str, sender: &str) -> CallId {
        let call_id = self.ringing(session_id, sender).await;
        self.native(NativeAction::Answer(call_id)).await;
        assert_eq!(self.state(), BridgeState::NativeActive);
        call_id
    }
}
