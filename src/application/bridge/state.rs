//! Bridge state machine states
//!
//! One state per active call. `Idle` means nothing is registered with the
//! native call UI.

/// Bridge state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
    /// No call registered with the native call UI
    #[default]
    Idle,
    /// Incoming call reported, waiting for the native report completion
    AwaitingNativeReport,
    /// Native call UI is ringing (incoming) or dialing (outgoing)
    NativeRinging,
    /// Native answer received, vendor accept in flight
    NativeAnswered,
    /// Call established on both sides
    NativeActive,
    /// Vendor reject/end in flight
    NativeEnding,
}

impl BridgeState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, next: BridgeState) -> bool {
        use BridgeState::*;

        match (self, next) {
            // Every state may collapse back to Idle
            (_, Idle) => true,

            // From Idle
            (Idle, AwaitingNativeReport) => true,
            (Idle, NativeRinging) => true,

            // From AwaitingNativeReport
            (AwaitingNativeReport, NativeRinging) => true,

            // From NativeRinging
            (NativeRinging, NativeAnswered) => true,
            (NativeRinging, NativeActive) => true,
            (NativeRinging, NativeEnding) => true,

            // From NativeAnswered
            (NativeAnswered, NativeActive) => true,
            (NativeAnswered, NativeEnding) => true,

            // From NativeActive
            (NativeActive, NativeEnding) => true,

            // All other transitions are invalid
            _ => false,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, BridgeState::Idle)
    }

    /// States in which a native "end" action starts a vendor hang-up
    pub fn can_hang_up(&self) -> bool {
        matches!(
            self,
            BridgeState::NativeRinging | BridgeState::NativeAnswered | BridgeState::NativeActive
        )
    }

    /// Get state name
    pub fn name(&self) -> &'static str {
        match self {
            BridgeState::Idle => "Idle",
            BridgeState::AwaitingNativeReport => "AwaitingNativeReport",
            BridgeState::NativeRinging => "NativeRinging",
            BridgeState::NativeAnswered => "NativeAnswered",
            BridgeState::NativeActive => "NativeActive",
            BridgeState::NativeEnding => "NativeEnding",
        }
    }
}
