//! JSON codec for [`RemoteMessage`].
//!
//! Each message is one JSON text frame on its data channel.  There is no
//! envelope, sequence number, or length prefix: the channel provides framing.

use thiserror::Error;

use crate::protocol::messages::RemoteMessage;

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// A button index outside `0..=4`.
    #[error("unknown mouse button index: {0}")]
    UnknownButton(u8),

    /// The text is not a well-formed message (bad JSON, unknown `type`, missing field).
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Serialization failed.
    #[error("failed to encode {kind} message: {reason}")]
    Encode { kind: &'static str, reason: String },
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`RemoteMessage`] into a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use lux_core::protocol::{decode_message, encode_message, MouseButton, RemoteMessage};
///
/// let msg = RemoteMessage::MouseDown { button: MouseButton::Left };
/// let text = encode_message(&msg).unwrap();
/// assert_eq!(text, r#"{"type":"mousedown","button":0}"#);
/// assert_eq!(decode_message(&text).unwrap(), msg);
/// ```
pub fn encode_message(msg: &RemoteMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode {
        kind: msg.kind(),
        reason: e.to_string(),
    })
}

/// Decodes one JSON text frame into a [`RemoteMessage`].
///
/// # Errors
///
/// Returns [`ProtocolError::Malformed`] for anything that is not a known message.
pub fn decode_message(text: &str) -> Result<RemoteMessage, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
