//! Remote-input message types and the delivery channel each one travels on.
//!
//! Every message is a flat JSON object with a lowercase `type` discriminator,
//! for example:
//!
//! ```json
//! {"type":"mousedown","button":0}
//! {"type":"mousemove","x":3,"y":-2}
//! {"type":"pen","x":960,"y":540,"pressure":0.42,"tiltX":10,"tiltY":-5}
//! ```
//!
//! # Why two channels? (for beginners)
//!
//! The remote peer accepts input on two data channels:
//!
//! - **Ordered / reliable** – button transitions, keys, touch and pen events.
//!   Losing or reordering a `mouseup` would leave a button stuck down on the
//!   remote machine, so these must arrive exactly once and in order.
//! - **Unordered / unreliable** – relative mouse motion and wheel deltas.  These
//!   are high-frequency and self-correcting: a dropped `mousemove` is simply
//!   overtaken by the next one, and waiting for a retransmit would only add lag.
//!
//! [`RemoteMessage::channel`] is an exhaustive `match`, so adding a new message
//! variant forces the author to decide which channel it belongs on.

use serde::{Deserialize, Serialize};

use crate::protocol::codec::ProtocolError;

/// Mouse button index as understood by the remote peer.
///
/// Serialized as its numeric index (`0` = left … `4` = forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum MouseButton {
    Left = 0,
    Middle = 1,
    Right = 2,
    Back = 3,
    Forward = 4,
}

impl MouseButton {
    /// Left ↔ right, everything else unchanged.
    pub fn swapped(self) -> Self {
        match self {
            MouseButton::Left => MouseButton::Right,
            MouseButton::Right => MouseButton::Left,
            other => other,
        }
    }
}

impl From<MouseButton> for u8 {
    fn from(button: MouseButton) -> Self {
        button as u8
    }
}

impl TryFrom<u8> for MouseButton {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MouseButton::Left),
            1 => Ok(MouseButton::Middle),
            2 => Ok(MouseButton::Right),
            3 => Ok(MouseButton::Back),
            4 => Ok(MouseButton::Forward),
            _ => Err(ProtocolError::UnknownButton(value)),
        }
    }
}

/// Delivery class of a data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Reliable, in-order delivery.
    Ordered,
    /// Best-effort, possibly reordered delivery.
    Unordered,
}

/// A single input message sent to the remote peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RemoteMessage {
    /// Relative pointer motion in remote pixels.
    MouseMove { x: i32, y: i32 },
    /// Absolute pointer position in remote-frame pixels.
    MouseMoveAbs { x: i32, y: i32 },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    /// Scroll deltas, already scaled.
    Wheel { x: f64, y: f64 },
    /// A key went down; `key` is the browser-style key code (e.g. `"KeyA"`).
    KeyDown { key: String },
    KeyUp { key: String },
    /// A direct-mode touch slot (`id` is in `0..10`) went down.
    TouchStart { id: u8, x: i32, y: i32 },
    TouchMove { id: u8, x: i32, y: i32 },
    TouchEnd { id: u8 },
    /// Stylus sample.  `pressure == 0` means the pen is lifted.
    Pen {
        x: i32,
        y: i32,
        pressure: f64,
        #[serde(rename = "tiltX")]
        tilt_x: i32,
        #[serde(rename = "tiltY")]
        tilt_y: i32,
    },
}

impl RemoteMessage {
    /// Channel this message must be sent on.
    pub fn channel(&self) -> Channel {
        match self {
            RemoteMessage::MouseMove { .. } | RemoteMessage::Wheel { .. } => Channel::Unordered,
            RemoteMessage::MouseMoveAbs { .. }
            | RemoteMessage::MouseDown { .. }
            | RemoteMessage::MouseUp { .. }
            | RemoteMessage::KeyDown { .. }
            | RemoteMessage::KeyUp { .. }
            | RemoteMessage::TouchStart { .. }
            | RemoteMessage::TouchMove { .. }
            | RemoteMessage::TouchEnd { .. }
            | RemoteMessage::Pen { .. } => Channel::Ordered,
        }
    }

    /// Wire `type` tag, handy for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteMessage::MouseMove { .. } => "mousemove",
            RemoteMessage::MouseMoveAbs { .. } => "mousemoveabs",
            RemoteMessage::MouseDown { .. } => "mousedown",
            RemoteMessage::MouseUp { .. } => "mouseup",
            RemoteMessage::Wheel { .. } => "wheel",
            RemoteMessage::KeyDown { .. } => "keydown",
            RemoteMessage::KeyUp { .. } => "keyup",
            RemoteMessage::TouchStart { .. } => "touchstart",
            RemoteMessage::TouchMove { .. } => "touchmove",
            RemoteMessage::TouchEnd { .. } => "touchend",
            RemoteMessage::Pen { .. } => "pen",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_try_from_valid_indices() {
        assert_eq!(MouseButton::try_from(0), Ok(MouseButton::Left));
        assert_eq!(MouseButton::try_from(2), Ok(MouseButton::Right));
        assert_eq!(MouseButton::try_from(4), Ok(MouseButton::Forward));
    }

    #[test]
    fn test_mouse_button_try_from_out_of_range_is_error() {
        assert_eq!(MouseButton::try_from(5), Err(ProtocolError::UnknownButton(5)));
    }

    #[test]
    fn test_swapped_exchanges_left_and_right_only() {
        assert_eq!(MouseButton::Left.swapped(), MouseButton::Right);
        assert_eq!(MouseButton::Right.swapped(), MouseButton::Left);
        assert_eq!(MouseButton::Middle.swapped(), MouseButton::Middle);
        assert_eq!(MouseButton::Back.swapped(), MouseButton::Back);
    }

    #[test]
    fn test_motion_and_wheel_use_unordered_channel() {
        assert_eq!(RemoteMessage::MouseMove { x: 1, y: 1 }.channel(), Channel::Unordered);
        assert_eq!(RemoteMessage::Wheel { x: 0.0, y: 8.0 }.channel(), Channel::Unordered);
    }

    #[test]
    fn test_state_bearing_messages_use_ordered_channel() {
        let ordered = [
            RemoteMessage::MouseMoveAbs { x: 1, y: 1 },
            RemoteMessage::MouseDown { button: MouseButton::Left },
            RemoteMessage::MouseUp { button: MouseButton::Left },
            RemoteMessage::KeyDown { key: "KeyA".into() },
            RemoteMessage::KeyUp { key: "KeyA".into() },
            RemoteMessage::TouchStart { id: 0, x: 1, y: 1 },
            RemoteMessage::TouchMove { id: 0, x: 1, y: 1 },
            RemoteMessage::TouchEnd { id: 0 },
            RemoteMessage::Pen { x: 1, y: 1, pressure: 0.5, tilt_x: 0, tilt_y: 0 },
        ];
        for msg in ordered {
            assert_eq!(msg.channel(), Channel::Ordered, "{} must be ordered", msg.kind());
        }
    }

    #[test]
    fn test_mousedown_serializes_with_numeric_button() {
        let json = serde_json::to_string(&RemoteMessage::MouseDown { button: MouseButton::Right })
            .unwrap();
        assert_eq!(json, r#"{"type":"mousedown","button":2}"#);
    }

    #[test]
    fn test_absolute_move_tag_is_mousemoveabs() {
        let json = serde_json::to_string(&RemoteMessage::MouseMoveAbs { x: 960, y: 540 }).unwrap();
        assert_eq!(json, r#"{"type":"mousemoveabs","x":960,"y":540}"#);
    }

    #[test]
    fn test_pen_serializes_camel_case_tilt() {
        let msg = RemoteMessage::Pen { x: 10, y: 20, pressure: 0.5, tilt_x: 3, tilt_y: -4 };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "pen");
        assert_eq!(value["tiltX"], 3);
        assert_eq!(value["tiltY"], -4);
    }

    #[test]
    fn test_deserialize_rejects_unknown_button_index() {
        let result: Result<RemoteMessage, _> =
            serde_json::from_str(r#"{"type":"mouseup","button":9}"#);
        assert!(result.is_err());
    }
}
