//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Serializing every call lifecycle input on one actor
//! - Driving the vendor SDK and native call UI through domain ports
//! - Keeping the handle registry consistent with both

pub mod bridge;

pub use bridge::{bridge_channel, BridgeHandle, BridgeSettings, BridgeState, CallLifecycleBridge};
