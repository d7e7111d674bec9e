//! ProtocolEncoder: turns classified intents into wire messages and sends
//! each on its channel.
//!
//! Encoding is a pure function ([`ProtocolEncoder::encode`]); dispatching is
//! fire-and-forget.  A message whose channel is not open is dropped, because
//! the next event re-asserts the state anyway (pointer position, wheel) or the
//! reconnect path starts from a clean slate (buttons, keys).

use std::sync::Arc;

use lux_core::{Channel, Intent, RemoteMessage};
use tracing::{trace, warn};

use crate::application::transport::{SendError, Transport};

/// Sends intents over a [`Transport`].
pub struct ProtocolEncoder {
    transport: Arc<dyn Transport>,
}

impl ProtocolEncoder {
    /// Creates an encoder bound to `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Maps one intent to the wire messages that express it.
    pub fn encode(intent: &Intent) -> Vec<RemoteMessage> {
        match intent {
            Intent::Click(button) => vec![
                RemoteMessage::MouseDown { button: *button },
                RemoteMessage::MouseUp { button: *button },
            ],
            Intent::Press(button) => vec![RemoteMessage::MouseDown { button: *button }],
            Intent::Release(button) => vec![RemoteMessage::MouseUp { button: *button }],
            Intent::Move { dx, dy } => vec![RemoteMessage::MouseMove { x: *dx, y: *dy }],
            Intent::MoveTo(at) => vec![RemoteMessage::MouseMoveAbs { x: at.x, y: at.y }],
            Intent::Scroll { dx, dy } => vec![RemoteMessage::Wheel { x: *dx, y: *dy }],
            Intent::Key { code, pressed: true } => vec![RemoteMessage::KeyDown { key: code.clone() }],
            Intent::Key { code, pressed: false } => vec![RemoteMessage::KeyUp { key: code.clone() }],
            Intent::TouchStart { slot, at } => vec![RemoteMessage::TouchStart {
                id: *slot,
                x: at.x,
                y: at.y,
            }],
            Intent::TouchMove { slot, at } => vec![RemoteMessage::TouchMove {
                id: *slot,
                x: at.x,
                y: at.y,
            }],
            Intent::TouchEnd { slot } => vec![RemoteMessage::TouchEnd { id: *slot }],
            Intent::Pen(sample) => vec![RemoteMessage::Pen {
                x: sample.at.x,
                y: sample.at.y,
                pressure: sample.pressure,
                tilt_x: sample.tilt_x,
                tilt_y: sample.tilt_y,
            }],
        }
    }

    /// Sends one message on the channel it belongs to.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`SendError`] unchanged.
    pub fn send(&self, message: &RemoteMessage) -> Result<(), SendError> {
        match message.channel() {
            Channel::Ordered => self.transport.send_ordered(message),
            Channel::Unordered => self.transport.send_unordered(message),
        }
    }

    /// Encodes and sends every intent, dropping what cannot be sent.
    ///
    /// Returns how many messages actually went out.
    pub fn dispatch<I>(&self, intents: I) -> usize
    where
        I: IntoIterator<Item = Intent>,
    {
        let mut sent = 0;
        for intent in intents {
            for message in Self::encode(&intent) {
                match self.send(&message) {
                    Ok(()) => sent += 1,
                    Err(SendError::ChannelNotOpen(channel)) => {
                        trace!(kind = message.kind(), ?channel, "channel not open, dropping");
                    }
                    Err(e) => warn!(kind = message.kind(), "dropping message: {e}"),
                }
            }
        }
        sent
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use lux_core::{FramePoint, MouseButton, PenSample};

    use crate::application::transport::TransportError;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingTransport {
        ordered: Mutex<Vec<RemoteMessage>>,
        unordered: Mutex<Vec<RemoteMessage>>,
        closed_channels: bool,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        fn send_ordered(&self, message: &RemoteMessage) -> Result<(), SendError> {
            if self.closed_channels {
                return Err(SendError::ChannelNotOpen(Channel::Ordered));
            }
            self.ordered.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn send_unordered(&self, message: &RemoteMessage) -> Result<(), SendError> {
            if self.closed_channels {
                return Err(SendError::ChannelNotOpen(Channel::Unordered));
            }
            self.unordered.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn local_description(&self) -> String {
            String::new()
        }

        async fn accept_answer(&self, _answer: &str) -> Result<(), TransportError> {
            Ok(())
        }

        fn close(&self) {}
    }

    fn encoder(transport: &Arc<RecordingTransport>) -> ProtocolEncoder {
        ProtocolEncoder::new(Arc::clone(transport) as Arc<dyn Transport>)
    }

    // ── Encoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_click_encodes_as_down_then_up() {
        assert_eq!(
            ProtocolEncoder::encode(&Intent::Click(MouseButton::Right)),
            vec![
                RemoteMessage::MouseDown { button: MouseButton::Right },
                RemoteMessage::MouseUp { button: MouseButton::Right },
            ]
        );
    }

    #[test]
    fn test_key_encodes_by_pressed_state() {
        assert_eq!(
            ProtocolEncoder::encode(&Intent::Key { code: "KeyQ".into(), pressed: false }),
            vec![RemoteMessage::KeyUp { key: "KeyQ".into() }]
        );
    }

    #[test]
    fn test_pen_encodes_all_fields() {
        let intent = Intent::Pen(PenSample {
            at: FramePoint::new(7, 8),
            pressure: 0.25,
            tilt_x: -10,
            tilt_y: 20,
        });
        assert_eq!(
            ProtocolEncoder::encode(&intent),
            vec![RemoteMessage::Pen { x: 7, y: 8, pressure: 0.25, tilt_x: -10, tilt_y: 20 }]
        );
    }

    #[test]
    fn test_touch_end_carries_only_slot() {
        assert_eq!(
            ProtocolEncoder::encode(&Intent::TouchEnd { slot: 4 }),
            vec![RemoteMessage::TouchEnd { id: 4 }]
        );
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    #[test]
    fn test_dispatch_routes_by_channel() {
        // Arrange
        let transport = Arc::new(RecordingTransport::default());
        let enc = encoder(&transport);

        // Act
        let sent = enc.dispatch(vec![
            Intent::Move { dx: 1, dy: 2 },
            Intent::Press(MouseButton::Left),
            Intent::Scroll { dx: 0.0, dy: 8.0 },
            Intent::MoveTo(FramePoint::new(5, 5)),
        ]);

        // Assert
        assert_eq!(sent, 4);
        assert_eq!(
            *transport.unordered.lock().unwrap(),
            vec![
                RemoteMessage::MouseMove { x: 1, y: 2 },
                RemoteMessage::Wheel { x: 0.0, y: 8.0 },
            ]
        );
        assert_eq!(
            *transport.ordered.lock().unwrap(),
            vec![
                RemoteMessage::MouseDown { button: MouseButton::Left },
                RemoteMessage::MouseMoveAbs { x: 5, y: 5 },
            ]
        );
    }

    #[test]
    fn test_dispatch_drops_silently_when_channel_not_open() {
        // Arrange
        let transport = Arc::new(RecordingTransport {
            closed_channels: true,
            ..RecordingTransport::default()
        });
        let enc = encoder(&transport);

        // Act
        let sent = enc.dispatch(vec![Intent::Click(MouseButton::Left), Intent::Move { dx: 1, dy: 0 }]);

        // Assert
        assert_eq!(sent, 0);
        assert!(transport.ordered.lock().unwrap().is_empty());
    }
}
