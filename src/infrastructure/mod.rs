//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - The vendor message parser
//! - Console adapters for the vendor SDK and native call UI ports
//! - Prometheus metrics

pub mod console;
pub mod metrics;
pub mod vendor;

pub use console::ConsolePorts;
pub use vendor::JsonMessageParser;
