//! Call lifecycle bridge
//!
//! Reconciles three views of the current call: the push payload, the vendor
//! call session, and the native call-UI handle. Every path that leaves
//! `Idle` has a path back that reports the call ended to the native side,
//! and the registry guarantees that report happens exactly once per handle.

use super::handle::{BridgeHandle, BridgeInbox};
use super::state::BridgeState;
use super::BridgeSettings;
use crate::domain::call::aggregate::CallSession;
use crate::domain::call::event::{BridgeEvent, Completion, HangupRpc, NativeAction, VendorEvent};
use crate::domain::call::ports::{CallPorts, CallTransaction, CallUpdate};
use crate::domain::call::value_object::{CallDirection, CallStatus, EndReason};
use crate::domain::registry::NativeCallHandleRegistry;
use crate::domain::shared::error::{DecodeError, RegistryError};
use crate::domain::shared::value_objects::{CallId, SessionId};
use crate::infrastructure::metrics::{
    CALLS_ENDED, INCOMING_REPORTED, MISSED_CALL_NOTIFICATIONS, VENDOR_RPC_FAILURES,
};
use chrono::Utc;
use futures::Future;
use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The call the bridge is currently driving
#[derive(Debug)]
struct ActiveCall {
    session: CallSession,
    /// In-call surface is on screen
    presented: bool,
}

/// The bridge state machine. Owns the handle registry.
pub struct CallLifecycleBridge {
    ports: CallPorts,
    registry: NativeCallHandleRegistry,
    settings: BridgeSettings,
    state: BridgeState,
    active: Option<ActiveCall>,
    /// Incoming call left to the in-app UI, kept for its missed-call alert
    foreground_call: Option<CallSession>,
    completions: mpsc::WeakUnboundedSender<BridgeEvent>,
    in_flight: usize,
}

impl CallLifecycleBridge {
    pub fn new(
        ports: CallPorts,
        registry: NativeCallHandleRegistry,
        settings: BridgeSettings,
        handle: &BridgeHandle,
    ) -> Self {
        Self {
            ports,
            registry,
            settings,
            state: BridgeState::Idle,
            active: None,
            foreground_call: None,
            completions: handle.downgrade(),
            in_flight: 0,
        }
    }

    /// Process inbox events until every handle is dropped and nothing is in flight
    pub async fn run(mut self, mut inbox: BridgeInbox) {
        info!("Call lifecycle bridge started");
        while let Some(event) = inbox.recv().await {
            self.handle(event);
        }
        self.release_abandoned();
        info!("Call lifecycle bridge stopped");
    }

    /// Process inbox events until no asynchronous operation is outstanding
    pub async fn settle(&mut self, inbox: &mut BridgeInbox) {
        loop {
            match inbox.try_recv() {
                Ok(event) => self.handle(event),
                Err(_) if self.in_flight == 0 => break,
                Err(_) => match inbox.recv().await {
                    Some(event) => self.handle(event),
                    None => {
                        self.release_abandoned();
                        break;
                    }
                },
            }
        }
    }

    /// The transition function. Every input goes through here.
    ///
    /// Asynchronous collaborator calls are spawned onto the tokio runtime, so
    /// this must run inside one; `run` and `settle` drive it.
    pub(crate) fn handle(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::PushDecoded(decoded) => self.on_push(decoded),
            BridgeEvent::Vendor(event) => self.on_vendor_event(event),
            BridgeEvent::Native(action) => self.on_native_action(action),
            BridgeEvent::Completion(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.on_completion(completion);
            }
        }
    }

    // Getters
    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn registry(&self) -> &NativeCallHandleRegistry {
        &self.registry
    }

    pub fn active_session(&self) -> Option<&CallSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // Push events

    fn on_push(&mut self, decoded: Result<CallSession, DecodeError>) {
        let session = match decoded {
            Ok(session) => session,
            Err(DecodeError::NotACall) => {
                debug!("Ignoring push that is not a call");
                return;
            }
            Err(err) => {
                if self.registry.current().is_some() {
                    error!(error = %err, "Malformed call push, ending registered call");
                    self.finish(EndReason::RemoteEnded);
                } else {
                    debug!(error = %err, "Malformed call push with no registered call");
                }
                return;
            }
        };

        match session.status() {
            CallStatus::Initiated => self.on_incoming_initiated(session),
            CallStatus::Ringing | CallStatus::Ongoing => {
                debug!(session_id = %session.session_id(), status = ?session.status(), "Push needs no action");
            }
            _ => self.on_terminal_push(session),
        }
    }

    fn on_incoming_initiated(&mut self, mut session: CallSession) {
        if self.is_registered_session(session.session_id()) {
            debug!(session_id = %session.session_id(), "Duplicate initiated push");
            return;
        }

        if self.ports.app_state.is_foreground() {
            info!(session_id = %session.session_id(), "App in foreground, in-app UI owns the incoming call");
            self.foreground_call = Some(session);
            return;
        }

        let Some(call_id) = self.register(&mut session) else {
            return;
        };

        let update = CallUpdate {
            remote_handle: session.remote_handle(),
            has_video: session.media_kind().has_video(),
        };
        info!(
            %call_id,
            session_id = %session.session_id(),
            remote = %update.remote_handle,
            has_video = update.has_video,
            "Reporting incoming call"
        );

        self.active = Some(ActiveCall {
            session,
            presented: false,
        });
        self.transition(BridgeState::AwaitingNativeReport);

        let provider = self.ports.provider.clone();
        let spawned = self.spawn_op(async move {
            let result = provider.report_incoming_call(call_id, update).await;
            Completion::NativeReport { call_id, result }
        });
        if spawned {
            counter!(INCOMING_REPORTED).increment(1);
        } else {
            // Never reported, so there is nothing to end
            self.registry.clear();
            self.active = None;
            self.transition(BridgeState::Idle);
        }
    }

    fn on_terminal_push(&mut self, session: CallSession) {
        if self.on_foreground_terminal(&session) {
            return;
        }
        if !self.is_registered_session(session.session_id()) {
            debug!(
                session_id = %session.session_id(),
                status = ?session.status(),
                "Terminal push for a call that is not registered"
            );
            return;
        }

        let status = session.status();
        let reason = status.end_reason().unwrap_or(EndReason::RemoteEnded);
        info!(session_id = %session.session_id(), ?status, %reason, "Call terminated by push");
        self.finish(reason);

        if status.is_missed() {
            self.schedule_missed_call(session.remote_display_name());
        }
    }

    /// Terminal push for a call the in-app UI owned. Returns whether it matched.
    fn on_foreground_terminal(&mut self, session: &CallSession) -> bool {
        let call = match self.foreground_call.take() {
            Some(call) if call.session_id() == session.session_id() => call,
            other => {
                self.foreground_call = other;
                return false;
            }
        };

        info!(session_id = %session.session_id(), status = ?session.status(), "Foreground call terminated by push");
        if session.status().is_missed() {
            let sender = if session.remote_display_name().is_empty() {
                call.remote_display_name()
            } else {
                session.remote_display_name()
            };
            self.schedule_missed_call(sender);
        }
        true
    }

    // Vendor events

    fn on_vendor_event(&mut self, event: VendorEvent) {
        debug!(event = event.name(), session_id = %event.session().session_id(), state = self.state.name(), "Vendor event");

        match event {
            VendorEvent::CallInitiated(session) => self.on_outgoing_initiated(session),
            VendorEvent::CallEnded(session) => self.on_vendor_call_ended(session),
            VendorEvent::IncomingCallAccepted(session) => {
                // Accepted from the in-app UI: the vendor side is already accepted
                let Some(call_id) = self.registered_call_for(session.session_id()) else {
                    return;
                };
                if self.state != BridgeState::NativeRinging {
                    debug!(%call_id, state = self.state.name(), "Incoming accept needs no action");
                    return;
                }
                self.request_transaction(CallTransaction::Answer(call_id));
                self.set_active_status(CallStatus::Ongoing);
                self.transition(BridgeState::NativeActive);
            }
            VendorEvent::IncomingCallRejected(session) => {
                if self.registered_call_for(session.session_id()).is_some() {
                    self.finish(EndReason::RemoteEnded);
                }
            }
            VendorEvent::OutgoingCallAccepted(session) => {
                let Some(call_id) = self.registered_call_for(session.session_id()) else {
                    return;
                };
                if self.state != BridgeState::NativeRinging {
                    debug!(%call_id, state = self.state.name(), "Outgoing accept needs no action");
                    return;
                }
                self.request_transaction(CallTransaction::Answer(call_id));
                self.set_active_status(CallStatus::Ongoing);
                self.transition(BridgeState::NativeActive);
            }
            VendorEvent::OutgoingCallRejected(session) => {
                let Some(call_id) = self.registered_call_for(session.session_id()) else {
                    return;
                };
                self.request_transaction(CallTransaction::End(call_id));
                self.finish(EndReason::Unanswered);
            }
        }
    }

    fn on_outgoing_initiated(&mut self, mut session: CallSession) {
        if session.direction() != CallDirection::Outgoing {
            warn!(session_id = %session.session_id(), "Call initiated event for an incoming session");
        }
        if self.is_registered_session(session.session_id()) {
            debug!(session_id = %session.session_id(), "Duplicate call initiated event");
            return;
        }

        let Some(call_id) = self.register(&mut session) else {
            return;
        };
        let handle = session.remote_display_name().to_string();
        info!(%call_id, session_id = %session.session_id(), remote = %handle, "Starting outgoing call");

        self.active = Some(ActiveCall {
            session,
            presented: false,
        });
        self.transition(BridgeState::NativeRinging);
        self.request_transaction(CallTransaction::Start { call_id, handle });
    }

    fn on_vendor_call_ended(&mut self, session: CallSession) {
        let Some(call_id) = self.registered_call_for(session.session_id()) else {
            return;
        };
        info!(%call_id, session_id = %session.session_id(), "Remote party ended the call");
        if self.state == BridgeState::NativeEnding {
            // The local hang-up completion will be stale, so end media here
            self.ports.media.end_session();
        }
        self.request_transaction(CallTransaction::End(call_id));
        self.dismiss_surface();
        self.finish(EndReason::RemoteEnded);
    }

    // Native call-UI actions

    fn on_native_action(&mut self, action: NativeAction) {
        match action {
            NativeAction::Mute { call_id, muted } => {
                debug!(%call_id, muted, "Forwarding mute to media session");
                self.ports.media.set_audio_muted(muted);
            }
            NativeAction::ProviderReset => {
                if self.registry.current().is_some() {
                    warn!("Native provider reset with a registered call");
                    self.finish(EndReason::Unanswered);
                } else {
                    debug!("Native provider reset with nothing registered");
                    self.active = None;
                    self.transition(BridgeState::Idle);
                }
            }
            NativeAction::Answer(call_id) => self.on_native_answer(call_id),
            NativeAction::End(call_id) => self.on_native_end(call_id),
        }
    }

    fn on_native_answer(&mut self, call_id: CallId) {
        let Some(session_id) = self.registered_session(call_id) else {
            debug!(%call_id, "Answer for a handle that is not registered");
            return;
        };
        if self.state != BridgeState::NativeRinging {
            debug!(%call_id, state = self.state.name(), "Answer ignored");
            return;
        }

        info!(%call_id, %session_id, "Native answer, accepting vendor session");
        self.transition(BridgeState::NativeAnswered);

        let vendor = self.ports.vendor.clone();
        let spawned = self.spawn_op(async move {
            let result = vendor
                .accept_session(&session_id)
                .await
                .map(|accepted| accepted.session_id().clone());
            Completion::VendorAccept { call_id, result }
        });
        if !spawned {
            self.finish(EndReason::Failed);
        }
    }

    fn on_native_end(&mut self, call_id: CallId) {
        let Some(session_id) = self.registered_session(call_id) else {
            debug!(%call_id, "End for a handle that is not registered");
            return;
        };
        if !self.state.can_hang_up() {
            debug!(%call_id, state = self.state.name(), "End ignored");
            return;
        }

        let (rpc, target) = match self.ports.vendor.active_call() {
            None => (HangupRpc::Reject, session_id),
            Some(active)
                if active.status == CallStatus::Initiated && !active.initiated_by_local_user =>
            {
                (HangupRpc::Reject, session_id)
            }
            Some(active) => (HangupRpc::End, active.session_id),
        };

        info!(%call_id, session_id = %target, rpc = rpc.as_str(), "Native end, hanging up vendor session");
        self.transition(BridgeState::NativeEnding);

        let vendor = self.ports.vendor.clone();
        let spawned = self.spawn_op(async move {
            let result = match rpc {
                HangupRpc::Reject => vendor.reject_session(&target, CallStatus::Rejected).await,
                HangupRpc::End => vendor.end_session(&target).await,
            };
            Completion::VendorHangup {
                call_id,
                rpc,
                result,
            }
        });
        if !spawned {
            self.finish(EndReason::RemoteEnded);
        }
    }

    // Completions

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::NativeReport { call_id, result } => {
                if !self.registry.is_registered(call_id)
                    || self.state != BridgeState::AwaitingNativeReport
                {
                    debug!(%call_id, state = self.state.name(), "Stale native report completion");
                    return;
                }
                match result {
                    Ok(()) => {
                        if let Err(err) = self.ports.audio.configure_for_call() {
                            warn!(error = %err, "Failed to configure audio session");
                        }
                        self.transition(BridgeState::NativeRinging);
                    }
                    Err(err) => {
                        // The OS never showed the call, so there is nothing to end
                        error!(%call_id, error = %err, "Native incoming call report failed");
                        self.registry.clear();
                        self.active = None;
                        self.transition(BridgeState::Idle);
                    }
                }
            }
            Completion::VendorAccept { call_id, result } => {
                if !self.registry.is_registered(call_id) || self.state != BridgeState::NativeAnswered {
                    debug!(%call_id, state = self.state.name(), "Stale vendor accept completion");
                    return;
                }
                match result {
                    Ok(session_id) => self.present_surface(call_id, session_id),
                    Err(err) => {
                        error!(%call_id, error = %err, "Vendor accept failed");
                        counter!(VENDOR_RPC_FAILURES, "rpc" => "accept_session").increment(1);
                        self.finish(EndReason::Failed);
                    }
                }
            }
            Completion::VendorHangup {
                call_id,
                rpc,
                result,
            } => {
                if !self.registry.is_registered(call_id) {
                    debug!(%call_id, rpc = rpc.as_str(), "Stale vendor hang-up completion");
                    return;
                }
                match result {
                    Ok(()) => {
                        if rpc == HangupRpc::End {
                            self.ports.media.end_session();
                        }
                        self.dismiss_surface();
                    }
                    Err(err) => {
                        error!(%call_id, rpc = rpc.as_str(), error = %err, "Vendor hang-up failed");
                        counter!(VENDOR_RPC_FAILURES, "rpc" => rpc.as_str()).increment(1);
                    }
                }
                self.finish(EndReason::RemoteEnded);
            }
            Completion::Transaction { action, result } => match result {
                Ok(()) => debug!(call_id = %action.call_id(), action = action.name(), "Native transaction completed"),
                Err(err) => {
                    error!(call_id = %action.call_id(), action = action.name(), error = %err, "Native transaction failed");
                    let start_failed = matches!(action, CallTransaction::Start { .. });
                    if start_failed && self.registry.is_registered(action.call_id()) {
                        self.finish(EndReason::Failed);
                    }
                }
            },
            Completion::Notification { result } => match result {
                Ok(()) => debug!("Missed call notification scheduled"),
                Err(err) => warn!(error = %err, "Failed to schedule missed call notification"),
            },
        }
    }

    // Helpers

    /// Register a session, force-ending a stale registration first if needed
    fn register(&mut self, session: &mut CallSession) -> Option<CallId> {
        let call_id = match self.registry.register(session.session_id()) {
            Ok(call_id) => call_id,
            Err(RegistryError::AlreadyRegistered {
                call_id,
                session_id,
            }) => {
                warn!(
                    stale_call_id = %call_id,
                    stale_session_id = %session_id,
                    session_id = %session.session_id(),
                    "Another call is still registered, ending it first"
                );
                self.finish(EndReason::RemoteEnded);
                match self.registry.register(session.session_id()) {
                    Ok(call_id) => call_id,
                    Err(err) => {
                        error!(error = %err, "Could not register call handle");
                        return None;
                    }
                }
            }
        };

        if let Err(err) = session.attach_call_id(call_id) {
            error!(error = %err, "Session already carries a different handle");
            self.registry.clear();
            return None;
        }
        Some(call_id)
    }

    /// The single way back to `Idle` for a registered call
    fn finish(&mut self, reason: EndReason) {
        if self.active.as_ref().is_some_and(|active| active.presented) {
            self.dismiss_surface();
        }

        let mut active = self.active.take();
        if let Some(active) = active.as_mut() {
            active.session.release_call_id();
        }

        match self.registry.clear() {
            Some(registered) => {
                self.ports
                    .provider
                    .report_call_ended(registered.call_id, Utc::now(), reason);
                counter!(CALLS_ENDED, "reason" => reason.as_str()).increment(1);
                info!(
                    call_id = %registered.call_id,
                    session_id = %registered.session_id,
                    %reason,
                    "Reported call ended"
                );
            }
            None => debug!(%reason, "No registered call to end"),
        }

        self.transition(BridgeState::Idle);
    }

    fn present_surface(&mut self, call_id: CallId, accepted: SessionId) {
        let Some(active) = self.active.as_mut() else {
            warn!(%call_id, "Vendor accepted a call the bridge no longer tracks");
            return;
        };
        let session_id = if accepted.is_empty() {
            active.session.session_id().clone()
        } else {
            accepted
        };

        info!(%call_id, %session_id, "Vendor accepted, presenting in-call surface");
        self.ports.presenter.present(&session_id, &self.settings.in_call);
        active.presented = true;
        active.session.set_status(CallStatus::Ongoing);
        self.transition(BridgeState::NativeActive);
    }

    fn dismiss_surface(&mut self) {
        self.ports.presenter.dismiss();
        self.ports.presenter.refresh();
        if let Some(active) = self.active.as_mut() {
            active.presented = false;
        }
    }

    fn schedule_missed_call(&mut self, sender: &str) {
        if !self.settings.missed_call_enabled {
            return;
        }
        if sender.is_empty() {
            debug!("Missed call without a known sender, no notification");
            return;
        }

        counter!(MISSED_CALL_NOTIFICATIONS).increment(1);
        let notifier = self.ports.notifier.clone();
        let title = sender.to_string();
        let body = self.settings.missed_call_body.clone();
        self.spawn_op(async move {
            let result = notifier.schedule_notification(title, body).await;
            Completion::Notification { result }
        });
    }

    fn request_transaction(&mut self, action: CallTransaction) {
        debug!(call_id = %action.call_id(), action = action.name(), "Requesting native transaction");
        let controller = self.ports.controller.clone();
        self.spawn_op(async move {
            let result = controller.request_transaction(action.clone()).await;
            Completion::Transaction { action, result }
        });
    }

    /// Run an asynchronous operation and redeliver its completion to the inbox
    ///
    /// Returns false when the inbox is closed and the operation was not started.
    fn spawn_op<F>(&mut self, op: F) -> bool
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let Some(tx) = self.completions.upgrade() else {
            warn!("Bridge inbox closed, dropping operation");
            return false;
        };
        self.in_flight += 1;
        tokio::spawn(async move {
            let completion = op.await;
            if tx.send(BridgeEvent::Completion(completion)).is_err() {
                debug!("Bridge inbox closed before completion");
            }
        });
        true
    }

    /// Inbox closed: no completion can arrive, so end whatever is still registered
    fn release_abandoned(&mut self) {
        if self.registry.current().is_some() {
            warn!(state = self.state.name(), "Bridge inbox closed with a registered call");
            self.finish(EndReason::RemoteEnded);
        }
    }

    fn transition(&mut self, next: BridgeState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            warn!(from = self.state.name(), to = next.name(), "Unexpected bridge transition");
        }
        debug!(from = self.state.name(), to = next.name(), "Bridge transition");
        self.state = next;
    }

    fn set_active_status(&mut self, status: CallStatus) {
        if let Some(active) = self.active.as_mut() {
            active.session.set_status(status);
        }
    }

    fn is_registered_session(&self, session_id: &SessionId) -> bool {
        matches!(self.registry.current(), Some(registered) if &registered.session_id == session_id)
    }

    fn registered_call_for(&self, session_id: &SessionId) -> Option<CallId> {
        match self.registry.current() {
            Some(registered) if &registered.session_id == session_id => Some(registered.call_id),
            Some(registered) => {
                debug!(
                    registered = %registered.session_id,
                    %session_id,
                    "Event for a session that is not registered"
                );
                None
            }
            None => {
                debug!(%session_id, "Event with no registered call");
                None
            }
        }
    }

    fn registered_session(&self, call_id: CallId) -> Option<SessionId> {
        self.registry
            .current()
            .filter(|registered| registered.call_id == call_id)
            .map(|registered| registered.session_id.clone())
    }
}
