//! Push call decoder
//!
//! Pure translation from a push payload to a [`CallSession`]. The decoder
//! never touches the native call UI or the handle registry.

use crate::domain::call::aggregate::CallSession;
use crate::domain::call::ports::{DecodedMessage, MessageParser, PushPayload};
use crate::domain::shared::error::DecodeError;
use std::sync::Arc;

/// Key of the vendor message embedded in every vendor push
pub const MESSAGE_KEY: &str = "message";

/// Decodes vendor call pushes
#[derive(Clone)]
pub struct PushCallDecoder {
    parser: Arc<dyn MessageParser>,
}

impl PushCallDecoder {
    pub fn new(parser: Arc<dyn MessageParser>) -> Self {
        Self { parser }
    }

    /// Decode a push payload into an incoming call session
    pub fn decode(&self, payload: &PushPayload) -> Result<CallSession, DecodeError> {
        let message = match payload.get(MESSAGE_KEY) {
            Some(message) if !message.is_null() => message,
            _ => return Err(DecodeError::MissingMessage),
        };

        match self.parser.parse(message) {
            Ok(DecodedMessage::Call(call)) => Ok(CallSession::incoming(
                call.session_id,
                call.status,
                call.media_kind,
                call.sender_display_name.unwrap_or_default(),
            )),
            Ok(DecodedMessage::Other(_)) => Err(DecodeError::NotACall),
            Err(reason) => Err(DecodeError::VendorParseFailure(reason)),
        }
    }

    /// Whether the payload carries a message the vendor parser accepts, of any category
    pub fn is_vendor_notification(&self, payload: &PushPayload) -> bool {
        match payload.get(MESSAGE_KEY) {
            Some(message) if !message.is_null() => self.parser.parse(message).is_ok(),
            _ => false,
        }
    }
}
