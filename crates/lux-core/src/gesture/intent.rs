//! Classified input intents: the recognizer's output.
//!
//! An [`Intent`] says *what the user meant* ("click the right button", "scroll
//! down 16 units") without saying how it is encoded on the wire.  One intent
//! may become several wire messages (a click is a press followed by a release).

use crate::domain::geometry::FramePoint;
use crate::protocol::messages::MouseButton;

/// One stylus sample in frame space, ready to send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenSample {
    pub at: FramePoint,
    /// `0.0` means lifted; in-contact samples are never below the floor.
    pub pressure: f64,
    /// Whole degrees.
    pub tilt_x: i32,
    pub tilt_y: i32,
}

/// A classified, encoder-ready input intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Press and immediately release.
    Click(MouseButton),
    Press(MouseButton),
    Release(MouseButton),
    /// Relative motion in remote pixels.
    Move { dx: i32, dy: i32 },
    /// Absolute position in frame pixels.
    MoveTo(FramePoint),
    Scroll { dx: f64, dy: f64 },
    Key { code: String, pressed: bool },
    TouchStart { slot: u8, at: FramePoint },
    TouchMove { slot: u8, at: FramePoint },
    TouchEnd { slot: u8 },
    Pen(PenSample),
}
