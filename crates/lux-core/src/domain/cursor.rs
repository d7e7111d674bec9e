//! Client-side virtual cursor.
//!
//! In *client-side mouse* mode the client renders its own cursor overlay and
//! tells the remote machine where it is with absolute `mousemoveabs` messages.
//! The cursor position lives in viewport space and is always clamped to the
//! viewport: `[0, width-1] × [0, height-1]`.
//!
//! The cursor survives reconnects: a replacement session is handed the same
//! [`VirtualCursor`] value so the overlay does not jump.

use crate::domain::geometry::{Point, Size};

/// Absolute cursor position in viewport coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCursor {
    position: Point,
    bounds: Size,
}

impl VirtualCursor {
    /// Creates a cursor centred in `bounds`.
    pub fn new(bounds: Size) -> Self {
        let centre = Point::new(
            f64::from(bounds.width) / 2.0,
            f64::from(bounds.height) / 2.0,
        );
        let mut cursor = Self {
            position: centre,
            bounds,
        };
        cursor.position = cursor.clamp(centre);
        cursor
    }

    /// Current position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Viewport the cursor is confined to.
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Moves the cursor by a relative delta and returns the clamped position.
    pub fn move_by(&mut self, dx: f64, dy: f64) -> Point {
        self.position = self.clamp(Point::new(self.position.x + dx, self.position.y + dy));
        self.position
    }

    /// Adopts new viewport bounds.
    ///
    /// The stored position is re-clamped into the new bounds but otherwise
    /// left where it was.
    pub fn resize(&mut self, bounds: Size) {
        self.bounds = bounds;
        self.position = self.clamp(self.position);
    }

    fn clamp(&self, p: Point) -> Point {
        Point::new(
            clamp_axis(p.x, self.bounds.width),
            clamp_axis(p.y, self.bounds.height),
        )
    }
}

impl Default for VirtualCursor {
    fn default() -> Self {
        Self::new(Size::default())
    }
}

fn clamp_axis(value: f64, extent: u32) -> f64 {
    if extent == 0 {
        return 0.0;
    }
    value.clamp(0.0, f64::from(extent - 1))
}
