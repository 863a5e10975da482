//! Inbox of the bridge actor
//!
//! All inputs reach the bridge through a [`BridgeHandle`]. Push decoding runs
//! on the caller's task; only the decoded result crosses into the inbox.

use crate::domain::call::event::{BridgeEvent, NativeAction, VendorEvent};
use crate::domain::call::ports::PushPayload;
use crate::domain::push::PushCallDecoder;
use crate::domain::shared::error::BridgeError;
use crate::domain::shared::result::Result;
use tokio::sync::mpsc;
use tracing::trace;

/// Receiving side of the bridge inbox
pub type BridgeInbox = mpsc::UnboundedReceiver<BridgeEvent>;

/// Create a bridge handle and the inbox it feeds
pub fn bridge_channel(decoder: PushCallDecoder) -> (BridgeHandle, BridgeInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeHandle { tx, decoder }, rx)
}

/// Cloneable sender into the bridge's single-actor inbox
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::UnboundedSender<BridgeEvent>,
    decoder: PushCallDecoder,
}

impl BridgeHandle {
    /// Decode a push payload and hand the result to the bridge
    pub fn deliver_push(&self, payload: &PushPayload) -> Result<()> {
        let decoded = self.decoder.decode(payload);
        trace!(ok = decoded.is_ok(), "Decoded push payload");
        self.send(BridgeEvent::PushDecoded(decoded))
    }

    /// Whether a notification payload came from the vendor
    pub fn is_vendor_notification(&self, payload: &PushPayload) -> bool {
        self.decoder.is_vendor_notification(payload)
    }

    pub fn vendor_event(&self, event: VendorEvent) -> Result<()> {
        self.send(BridgeEvent::Vendor(event))
    }

    pub fn native_action(&self, action: NativeAction) -> Result<()> {
        self.send(BridgeEvent::Native(action))
    }

    pub fn send(&self, event: BridgeEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| BridgeError::InboxClosed)
    }

    /// Sender that does not keep the inbox open on its own
    pub(crate) fn downgrade(&self) -> mpsc::WeakUnboundedSender<BridgeEvent> {
        self.tx.downgrade()
    }
}
