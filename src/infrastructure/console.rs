//! Console adapters
//!
//! Tracing-backed implementations of every collaborator port. They log what
//! a real vendor SDK or native call UI would be asked to do and succeed after
//! a short simulated latency. Used by the demo binary.

use crate::config::ProviderConfig;
use crate::domain::call::aggregate::CallSession;
use crate::domain::call::ports::{
    AppState, AudioSession, CallPorts, CallTransaction, CallUpdate, InCallSettings,
    IncomingCallPresenter, LocalNotifier, MediaSession, NativeCallController, NativeCallProvider,
    VendorActiveCall, VendorCallClient,
};
use crate::domain::call::value_object::{CallStatus, EndReason, MediaKind};
use crate::domain::shared::error::{NativeReportError, VendorRpcError};
use crate::domain::shared::value_objects::{CallId, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

const SIMULATED_LATENCY: Duration = Duration::from_millis(20);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Vendor SDK stand-in tracking the vendor's active call
#[derive(Debug, Default)]
pub struct ConsoleVendorClient {
    active: Mutex<Option<VendorActiveCall>>,
}

impl ConsoleVendorClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call the local user placed
    pub fn place_call(&self, session_id: SessionId) {
        *lock(&self.active) = Some(VendorActiveCall {
            session_id,
            status: CallStatus::Initiated,
            initiated_by_local_user: true,
        });
    }

    /// Mark the active call as answered by the remote party
    pub fn remote_answered(&self) {
        if let Some(active) = lock(&self.active).as_mut() {
            active.status = CallStatus::Ongoing;
        }
    }
}

#[async_trait]
impl VendorCallClient for ConsoleVendorClient {
    async fn accept_session(&self, session_id: &SessionId) -> Result<CallSession, VendorRpcError> {
        tokio::time::sleep(SIMULATED_LATENCY).await;
        info!(%session_id, "vendor: accept session");
        *lock(&self.active) = Some(VendorActiveCall {
            session_id: session_id.clone(),
            status: CallStatus::Ongoing,
            initiated_by_local_user: false,
        });
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
        tokio::time::sleep(SIMULATED_LATENCY).await;
        info!(%session_id, ?status, "vendor: reject session");
        lock(&self.active).take();
        Ok(())
    }

    async fn end_session(&self, session_id: &SessionId) -> Result<(), VendorRpcError> {
        tokio::time::sleep(SIMULATED_LATENCY).await;
        info!(%session_id, "vendor: end session");
        lock(&self.active).take();
        Ok(())
    }

    fn active_call(&self) -> Option<VendorActiveCall> {
        lock(&self.active).clone()
    }
}

/// Native call-UI provider stand-in
#[derive(Debug, Clone)]
pub struct ConsoleNativeProvider {
    config: ProviderConfig,
}

impl ConsoleNativeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        info!(
            name = %config.localized_name,
            ringtone = %config.ringtone,
            recents = config.includes_calls_in_recents,
            video = config.supports_video,
            "native: provider configured"
        );
        Self { config }
    }
}

#[async_trait]
impl NativeCallProvider for ConsoleNativeProvider {
    async fn report_incoming_call(
        &self,
        call_id: CallId,
        update: CallUpdate,
    ) -> Result<(), NativeReportError> {
        tokio::time::sleep(SIMULATED_LATENCY).await;
        let has_video = update.has_video && self.config.supports_video;
        info!(
            %call_id,
            provider = %self.config.localized_name,
            remote = %update.remote_handle,
            has_video,
            "native: incoming call ringing"
        );
        Ok(())
    }

    fn report_call_ended(&self, call_id: CallId, ended_at: DateTime<Utc>, reason: EndReason) {
        info!(%call_id, %ended_at, %reason, "native: call ended");
    }
}

/// Native call controller stand-in
#[derive(Debug, Default)]
pub struct ConsoleCallController;

#[async_trait]
impl NativeCallController for ConsoleCallController {
    async fn request_transaction(&self, action: CallTransaction) -> Result<(), NativeReportError> {
        tokio::time::sleep(SIMULATED_LATENCY).await;
        match &action {
            CallTransaction::Start { call_id, handle } => {
                info!(%call_id, %handle, "native: start call transaction")
            }
            other => info!(call_id = %other.call_id(), action = other.name(), "native: transaction"),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsoleAudioSession;

impl AudioSession for ConsoleAudioSession {
    fn configure_for_call(&self) -> Result<(), String> {
        info!("audio: play-and-record, mix with others, bluetooth, speaker");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsoleMediaSession {
    muted: AtomicBool,
}

impl ConsoleMediaSession {
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }
}

impl MediaSession for ConsoleMediaSession {
    fn set_audio_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
        info!(muted, "media: audio mute");
    }

    fn end_session(&self) {
        info!("media: session ended");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl LocalNotifier for ConsoleNotifier {
    async fn schedule_notification(&self, title: String, body: String) -> Result<(), String> {
        info!(%title, %body, "notification: scheduled");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl IncomingCallPresenter for ConsolePresenter {
    fn present(&self, session_id: &SessionId, settings: &InCallSettings) {
        info!(
            %session_id,
            audio_only = settings.audio_only,
            switch_camera_disabled = settings.switch_camera_disabled,
            recording_button = settings.show_recording_button,
            "ui: in-call surface presented"
        );
    }

    fn dismiss(&self) {
        info!("ui: in-call surface dismissed");
    }

    fn refresh(&self) {
        info!("ui: underlying view refreshed");
    }
}

/// Application state that can be flipped at runtime
#[derive(Debug, Default)]
pub struct SwitchableAppState {
    foreground: AtomicBool,
}

impl SwitchableAppState {
    pub fn new(foreground: bool) -> Self {
        Self {
            foreground: AtomicBool::new(foreground),
        }
    }

    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }
}

impl AppState for SwitchableAppState {
    fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }
}

/// Console adapters wired together
pub struct ConsolePorts {
    pub vendor: Arc<ConsoleVendorClient>,
    pub media: Arc<ConsoleMediaSession>,
    pub app_state: Arc<SwitchableAppState>,
    pub ports: CallPorts,
}

impl ConsolePorts {
    pub fn new(provider: ProviderConfig) -> Self {
        let vendor = Arc::new(ConsoleVendorClient::new());
        let media = Arc::new(ConsoleMediaSession::default());
        let app_state = Arc::new(SwitchableAppState::new(false));

        let ports = CallPorts {
            vendor: vendor.clone(),
            provider: Arc::new(ConsoleNativeProvider::new(provider)),
            controller: Arc::new(ConsoleCallController),
            audio: Arc::new(ConsoleAudioSession),
            media: media.clone(),
            notifier: Arc::new(ConsoleNotifier),
            presenter: Arc::new(ConsolePresenter),
            app_state: app_state.clone(),
        };

        Self {
            vendor,
            media,
            app_state,
            ports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vendor_tracks_active_call() {
        let vendor = ConsoleVendorClient::new();
        assert!(vendor.active_call().is_none());

        let session_id = SessionId::from("s1");
        vendor.accept_session(&session_id).await.unwrap();
        let active = vendor.active_call().unwrap();
        assert_eq!(active.session_id, session_id);
        assert!(!active.initiated_by_local_user);

        vendor.end_session(&session_id).await.unwrap();
        assert!(vendor.active_call().is_none());
    }

    #[tokio::test]
    async fn test_outgoing_call_tracking() {
        let vendor = ConsoleVendorClient::new();
        vendor.place_call(SessionId::from("s2"));
        assert_eq!(vendor.active_call().unwrap().status, CallStatus::Initiated);
        vendor.remote_answered();
        assert_eq!(vendor.active_call().unwrap().status, CallStatus::Ongoing);
        vendor
            .reject_session(&SessionId::from("s2"), CallStatus::Rejected)
            .await
            .unwrap();
        assert!(vendor.active_call().is_none());
    }

    #[test]
    fn test_app_state_and_mute() {
        let state = SwitchableAppState::new(false);
        assert!(!state.is_foreground());
        state.set_foreground(true);
        assert!(state.is_foreground());

        let media = ConsoleMediaSession::default();
        media.set_audio_muted(true);
        assert!(media.is_muted());
    }
}
