//! Call lifecycle bridge
//!
//! Single-actor state machine between push notifications, the vendor SDK and
//! the native call UI.

pub mod handle;
pub mod lifecycle;
pub mod state;

pub use handle::{bridge_channel, BridgeHandle, BridgeInbox};
pub use lifecycle::CallLifecycleBridge;
pub use state::BridgeState;

use crate::domain::call::ports::InCallSettings;

/// Behavior knobs of the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub missed_call_enabled: bool,
    pub missed_call_body: String,
    pub in_call: InCallSettings,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            missed_call_enabled: true,
            missed_call_body: "Missed call".to_string(),
            in_call: InCallSettings::default(),
        }
    }
}
