//! # lux-core
//!
//! Input-translation core for the Lux remote-desktop client: coordinate
//! mapping, gesture recognition, and the remote-input wire protocol.
//!
//! This crate has no runtime, network, or OS dependencies.  Everything in it is
//! synchronous and driven by explicit timestamps, so it can be tested and
//! benchmarked in isolation.
//!
//! # Architecture overview (for beginners)
//!
//! Lux streams a remote desktop into a local video surface and sends the
//! user's mouse, keyboard, touch and pen input back.  Input flows through the
//! crate like this:
//!
//! ```text
//!  InputEvent ──► GestureRecognizer ──► Intent ──► (encoder) ──► RemoteMessage
//!   (raw)          (touchpad rules,      (click,      lux-client     (JSON on an
//!                   pen, palm filter)     scroll…)                    ordered or
//!                                                                     unordered
//!                                                                     channel)
//! ```
//!
//! - **`domain`** – geometry.  [`map_to_frame`] converts a point in the local
//!   viewport into remote-frame pixels, undoing letterboxing.
//!   [`VirtualCursor`] is the clamped client-side cursor.
//!
//! - **`input`** – the raw event vocabulary a front end delivers.
//!
//! - **`gesture`** – the [`GestureRecognizer`] state machine that turns raw
//!   touch contacts into clicks, scrolls and drags.
//!
//! - **`protocol`** – [`RemoteMessage`], the wire messages, with the channel
//!   each travels on and a JSON codec.

pub mod domain;
pub mod gesture;
pub mod input;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `lux_core::GestureRecognizer` instead of the full module path.
pub use domain::cursor::VirtualCursor;
pub use domain::geometry::{map_to_frame, FramePoint, Point, Size, Surface};
pub use gesture::{GestureConfig, GestureRecognizer, Intent, PenSample};
pub use input::{ContactSample, InputEvent, PointerKind};
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::{Channel, MouseButton, RemoteMessage};
