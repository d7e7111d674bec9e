//! Domain entities for the Lux client.
//!
//! Pure geometry with no I/O: the letterbox-aware coordinate mapper and the
//! client-side virtual cursor.  Everything here can be unit-tested without a
//! runtime, a transport, or a display.

/// Viewport/frame sizes and the coordinate mapper.
pub mod geometry;

/// The clamped client-side cursor.
pub mod cursor;
