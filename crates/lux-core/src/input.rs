//! Local input events, as delivered by whatever front end hosts the client.
//!
//! These are the raw, unclassified events: mouse deltas, button transitions,
//! keys, and per-contact touch/pen samples.  They carry no timestamps; the
//! caller supplies the current monotonic time when handing them to the
//! [`GestureRecognizer`](crate::gesture::GestureRecognizer).
//!
//! The serde representation is one JSON object per event, tagged by `type`:
//!
//! ```json
//! {"type":"touch_start","contacts":[{"id":1,"x":100.0,"y":100.0}]}
//! {"type":"mouse_button","button":0,"pressed":true}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::geometry::Point;
use crate::protocol::messages::MouseButton;

/// What produced a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Touch,
    Pen,
}

/// One sample of one contact.
///
/// Optional fields default to zero, which is what touchscreens without
/// radius, pressure, or tilt sensors report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSample {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub kind: PointerKind,
    #[serde(default)]
    pub radius_x: f64,
    #[serde(default)]
    pub radius_y: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub tilt_x: f64,
    #[serde(default)]
    pub tilt_y: f64,
}

impl ContactSample {
    /// A finger contact with no sensor extras.
    pub fn touch(id: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            kind: PointerKind::Touch,
            radius_x: 0.0,
            radius_y: 0.0,
            pressure: 0.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
        }
    }

    /// A stylus contact.
    pub fn pen(id: u32, x: f64, y: f64, pressure: f64) -> Self {
        Self {
            kind: PointerKind::Pen,
            pressure,
            ..Self::touch(id, x, y)
        }
    }

    pub fn with_radius(mut self, radius_x: f64, radius_y: f64) -> Self {
        self.radius_x = radius_x;
        self.radius_y = radius_y;
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_tilt(mut self, tilt_x: f64, tilt_y: f64) -> Self {
        self.tilt_x = tilt_x;
        self.tilt_y = tilt_y;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A raw local input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Relative mouse motion (pointer-locked deltas).
    MouseMove { dx: f64, dy: f64 },
    MouseButton { button: MouseButton, pressed: bool },
    /// Physical wheel deltas, forwarded as-is.
    Wheel { dx: f64, dy: f64 },
    Key { code: String, pressed: bool },
    /// New contacts touched down.
    TouchStart { contacts: Vec<ContactSample> },
    /// Changed contacts.  A stylus may appear several times in one batch
    /// (coalesced samples); they are processed in order.
    TouchMove { contacts: Vec<ContactSample> },
    /// Contacts lifted, with their final positions.
    TouchEnd { contacts: Vec<ContactSample> },
    /// Contacts aborted by the platform.  No tap or click is recognised.
    TouchCancel { ids: Vec<u32> },
    /// The local viewport changed size.
    Resize { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_start_deserializes_with_defaults() {
        // Arrange
        let json = r#"{"type":"touch_start","contacts":[{"id":7,"x":10.5,"y":20.0}]}"#;

        // Act
        let event: InputEvent = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(
            event,
            InputEvent::TouchStart {
                contacts: vec![ContactSample::touch(7, 10.5, 20.0)]
            }
        );
    }

    #[test]
    fn test_pen_sample_deserializes_kind_and_pressure() {
        let json = r#"{"id":1,"x":0,"y":0,"kind":"pen","pressure":0.5,"tilt_x":12.4}"#;
        let sample: ContactSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.kind, PointerKind::Pen);
        assert_eq!(sample.pressure, 0.5);
        assert_eq!(sample.tilt_x, 12.4);
    }

    #[test]
    fn test_mouse_button_event_uses_numeric_button() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"mouse_button","button":2,"pressed":false}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::MouseButton { button: MouseButton::Right, pressed: false }
        );
    }

    #[test]
    fn test_pen_constructor_sets_kind() {
        let s = ContactSample::pen(3, 1.0, 2.0, 0.7);
        assert_eq!(s.kind, PointerKind::Pen);
        assert_eq!(s.position(), Point::new(1.0, 2.0));
    }
}
