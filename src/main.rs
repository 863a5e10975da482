use ringbridge::application::{bridge_channel, BridgeHandle, CallLifecycleBridge};
use ringbridge::application::bridge::BridgeInbox;
use ringbridge::config::Config;
use ringbridge::domain::call::{
    CallSession, CallStatus, MediaKind, NativeAction, PushPayload, VendorEvent,
};
use ringbridge::domain::push::PushCallDecoder;
use ringbridge::domain::registry::NativeCallHandleRegistry;
use ringbridge::domain::shared::value_objects::{CallId, SessionId};
use ringbridge::infrastructure::metrics::init_metrics;
use ringbridge::infrastructure::{ConsolePorts, JsonMessageParser};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RINGBRIDGE_CONFIG").ok())
        .map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting RingBridge call lifecycle demo");
    info!("Effective configuration:\n{}", config.to_toml_string()?);

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder unavailable: {}", e);
            None
        }
    };

    let console = ConsolePorts::new(config.provider.clone());
    let decoder = PushCallDecoder::new(Arc::new(JsonMessageParser::new()));
    let (handle, mut inbox) = bridge_channel(decoder);
    let mut bridge = CallLifecycleBridge::new(
        console.ports.clone(),
        NativeCallHandleRegistry::new(),
        config.bridge_settings(),
        &handle,
    );

    let mut demo = Demo {
        handle: &handle,
        inbox: &mut inbox,
        bridge: &mut bridge,
        console: &console,
    };
    demo.answered_incoming_call().await?;
    demo.missed_incoming_call().await?;
    demo.outgoing_call().await?;
    demo.foreground_incoming_call().await?;

    if let Some(metrics) = metrics {
        info!("Metrics snapshot:\n{}", metrics.render());
    }
    info!("RingBridge demo complete");

    Ok(())
}

fn call_push(session_id: &str, status: &str, sender: &str) -> PushPayload {
    let payload = json!({
        "message": {
            "category": "call",
            "type": "audio",
            "sessionId": session_id,
            "status": status,
            "sender": { "uid": sender.to_lowercase(), "name": sender }
        }
    });
    match payload {
        serde_json::Value::Object(map) => map,
        _ => PushPayload::new(),
    }
}

/// Scripted walk through the call lifecycle
struct Demo<'a> {
    handle: &'a BridgeHandle,
    inbox: &'a mut BridgeInbox,
    bridge: &'a mut CallLifecycleBridge,
    console: &'a ConsolePorts,
}

impl Demo<'_> {
    async fn settle(&mut self) {
        self.bridge.settle(&mut *self.inbox).await;
        info!("Bridge state: {}", self.bridge.state().name());
    }

    fn current_call_id(&self) -> anyhow::Result<CallId> {
        self.bridge
            .registry()
            .current()
            .map(|registered| registered.call_id)
            .ok_or_else(|| anyhow::anyhow!("no call registered"))
    }

    async fn answered_incoming_call(&mut self) -> anyhow::Result<()> {
        info!("=== Incoming call, answered then hung up remotely ===");
        self.handle
            .deliver_push(&call_push("demo-100", "initiated", "alice smith"))?;
        self.settle().await;

        let call_id = self.current_call_id()?;
        self.handle.native_action(NativeAction::Answer(call_id))?;
        self.settle().await;

        self.handle.native_action(NativeAction::Mute {
            call_id,
            muted: true,
        })?;
        self.settle().await;
        info!("Media muted: {}", self.console.media.is_muted());

        self.handle.vendor_event(VendorEvent::CallEnded(CallSession::incoming(
            "demo-100",
            CallStatus::Ended,
            MediaKind::Audio,
            "alice smith",
        )))?;
        self.settle().await;

        // The OS echoes the end transaction back; the handle is already released
        self.handle.native_action(NativeAction::End(call_id))?;
        self.settle().await;
        Ok(())
    }

    async fn missed_incoming_call(&mut self) -> anyhow::Result<()> {
        info!("=== Incoming call, cancelled by the caller ===");
        self.handle
            .deliver_push(&call_push("demo-101", "initiated", "Bob"))?;
        self.settle().await;
        self.handle
            .deliver_push(&call_push("demo-101", "cancelled", "Bob"))?;
        self.settle().await;

        let chat = json!({ "message": { "category": "message", "type": "text", "text": "hi" } });
        if let serde_json::Value::Object(chat) = chat {
            info!(
                "Chat push is a vendor notification: {}",
                self.handle.is_vendor_notification(&chat)
            );
            self.handle.deliver_push(&chat)?;
            self.settle().await;
        }
        Ok(())
    }

    async fn outgoing_call(&mut self) -> anyhow::Result<()> {
        info!("=== Outgoing call, accepted then hung up locally ===");
        let session_id = SessionId::from("demo-102");
        self.console.vendor.place_call(session_id.clone());
        self.handle.vendor_event(VendorEvent::CallInitiated(CallSession::outgoing(
            session_id.clone(),
            CallStatus::Initiated,
            MediaKind::Audio,
            "Carol",
        )))?;
        self.settle().await;

        self.console.vendor.remote_answered();
        self.handle
            .vendor_event(VendorEvent::OutgoingCallAccepted(CallSession::outgoing(
                session_id,
                CallStatus::Ongoing,
                MediaKind::Audio,
                "Carol",
            )))?;
        self.settle().await;

        let call_id = self.current_call_id()?;
        self.handle.native_action(NativeAction::End(call_id))?;
        self.settle().await;
        Ok(())
    }

    async fn foreground_incoming_call(&mut self) -> anyhow::Result<()> {
        info!("=== Incoming call while the app is in the foreground ===");
        self.console.app_state.set_foreground(true);
        self.handle
            .deliver_push(&call_push("demo-103", "initiated", "Dave"))?;
        self.settle().await;
        info!(
            "Registered after foreground push: {}",
            self.bridge.registry().current().is_some()
        );
        self.console.app_state.set_foreground(false);
        Ok(())
    }
}
