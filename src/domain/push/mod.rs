//! Push bounded context - turning push payloads into call sessions

pub mod decoder;

pub use decoder::{PushCallDecoder, MESSAGE_KEY};
