//! lux-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does lux-client do? (for beginners)
//!
//! The client sits between a local input surface and a remote host that is
//! streaming its desktop.  It:
//!
//! 1. Opens a transport and exchanges an offer/answer with the host over
//!    HTTP, authenticating with a password.
//! 2. Reads raw input events (mouse, keyboard, touch, pen) from an input
//!    source.
//! 3. Runs them through `lux_core`'s gesture recognizer, so that touch
//!    screens behave like a touchpad and pens send pressure samples.
//! 4. Sends the resulting messages on an ordered channel (clicks, keys,
//!    touches) or an unordered one (relative moves, wheel).
//! 5. Reconnects when the transport drops, keeping the cursor where it was.

/// Application layer: session lifecycle and input encoding.
pub mod application;

/// Infrastructure layer: WebSocket transport, HTTP signaling, config, input.
pub mod infrastructure;
