//! Viewport / video-frame geometry and the letterbox-aware coordinate mapper.
//!
//! The remote screen arrives as a video frame of `frame.width × frame.height`
//! pixels and is displayed inside a local box (the *viewport*) of a different
//! size.  The video element keeps the frame's aspect ratio, so whenever the two
//! aspect ratios differ the frame is padded with bars ("letterboxing"):
//!
//! ```text
//!   frame wider than viewport          frame narrower than viewport
//!  ┌──────────────────────┐            ┌──────┬──────────┬──────┐
//!  │░░░░░░░░ bar ░░░░░░░░░│            │░░░░░░│          │░░░░░░│
//!  ├──────────────────────┤            │░ bar░│  frame   │░bar ░│
//!  │        frame         │            │░░░░░░│          │░░░░░░│
//!  ├──────────────────────┤            │░░░░░░│          │░░░░░░│
//!  │░░░░░░░░ bar ░░░░░░░░░│            └──────┴──────────┴──────┘
//!  └──────────────────────┘
//! ```
//!
//! [`map_to_frame`] undoes that transform: given a point in viewport space it
//! returns the corresponding pixel in frame space.  Points inside the bars map
//! outside the frame; they are passed through unclamped so the remote side can
//! decide what to do with them.

use serde::{Deserialize, Serialize};

/// A point in local viewport space (CSS pixels, fractional).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Width × height in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either dimension is zero.
    ///
    /// An empty frame size is the normal state before the first media frame
    /// has been decoded.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// An absolute position in remote-frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FramePoint {
    pub x: i32,
    pub y: i32,
}

impl FramePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Maps a viewport point to remote-frame pixels, compensating for letterboxing.
///
/// Returns `None` when either size is empty; there is no meaningful mapping
/// until both the viewport and the frame have been measured.
///
/// The result is rounded to the nearest integer pixel.  The function is pure:
/// repeated calls with identical input always produce identical output.
///
/// # Examples
///
/// ```rust
/// use lux_core::domain::geometry::{map_to_frame, FramePoint, Point, Size};
///
/// // 16:9 frame shown in a square box: bars above and below.
/// let mapped = map_to_frame(
///     Point::new(500.0, 500.0),
///     Size::new(1000, 1000),
///     Size::new(1920, 1080),
/// );
/// assert_eq!(mapped, Some(FramePoint::new(960, 540)));
/// ```
pub fn map_to_frame(point: Point, viewport: Size, frame: Size) -> Option<FramePoint> {
    if viewport.is_empty() || frame.is_empty() {
        return None;
    }

    let vw = f64::from(viewport.width);
    let vh = f64::from(viewport.height);
    let fw = f64::from(frame.width);
    let fh = f64::from(frame.height);

    // Compare aspect ratios with integer cross-multiplication so that equal
    // ratios (e.g. 1280×720 vs 1920×1080) are detected exactly.
    let frame_cross = u64::from(frame.width) * u64::from(viewport.height);
    let viewport_cross = u64::from(viewport.width) * u64::from(frame.height);

    let (fx, fy) = match frame_cross.cmp(&viewport_cross) {
        std::cmp::Ordering::Greater => {
            // Frame is wider: full width used, bars above and below.
            let scale = vw / fw;
            let bar = (1.0 - viewport.aspect() / frame.aspect()) * vh / 2.0;
            (point.x / scale, (point.y - bar) / scale)
        }
        std::cmp::Ordering::Less => {
            // Frame is narrower: full height used, bars left and right.
            let scale = vh / fh;
            let bar = (1.0 - frame.aspect() / viewport.aspect()) * vw / 2.0;
            ((point.x - bar) / scale, point.y / scale)
        }
        std::cmp::Ordering::Equal => (point.x / (vw / fw), point.y / (vh / fh)),
    };

    Some(FramePoint::new(fx.round() as i32, fy.round() as i32))
}

/// The pair of sizes needed for mapping: the local viewport and the remote frame.
///
/// Both halves change independently: the viewport on window resize, the frame
/// whenever the stream is renegotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Surface {
    pub viewport: Size,
    pub frame: Size,
}

impl Surface {
    pub const fn new(viewport: Size, frame: Size) -> Self {
        Self { viewport, frame }
    }

    /// Maps `point` through the current viewport/frame pair.
    pub fn map(&self, point: Point) -> Option<FramePoint> {
        map_to_frame(point, self.viewport, self.frame)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_frame_in_square_viewport_maps_centre_to_centre() {
        // Arrange: 1920×1080 frame letterboxed into a 1000×1000 box
        let viewport = Size::new(1000, 1000);
        let frame = Size::new(1920, 1080);

        // Act
        let mapped = map_to_frame(Point::new(500.0, 500.0), viewport, frame);

        // Assert: fx = 500 / (1000/1920) = 960, fy = (500 - 218.75) * 1.92 = 540
        assert_eq!(mapped, Some(FramePoint::new(960, 540)));
    }

    #[test]
    fn test_wide_frame_top_bar_edge_maps_to_frame_row_zero() {
        // The visible frame starts 218.75px below the top of the box.
        let mapped = map_to_frame(
            Point::new(0.0, 218.75),
            Size::new(1000, 1000),
            Size::new(1920, 1080),
        );
        assert_eq!(mapped, Some(FramePoint::new(0, 0)));
    }

    #[test]
    fn test_point_inside_bar_maps_outside_frame_unclamped() {
        let mapped = map_to_frame(
            Point::new(0.0, 0.0),
            Size::new(1000, 1000),
            Size::new(1920, 1080),
        )
        .unwrap();
        assert!(mapped.y < 0, "bar region must map above the frame, got {mapped:?}");
    }

    #[test]
    fn test_narrow_frame_in_wide_viewport_uses_horizontal_bars() {
        // Arrange: 1000×1000 frame in a 2000×1000 box → 500px bars left and right
        let viewport = Size::new(2000, 1000);
        let frame = Size::new(1000, 1000);

        // Act
        let left_edge = map_to_frame(Point::new(500.0, 0.0), viewport, frame);
        let centre = map_to_frame(Point::new(1000.0, 500.0), viewport, frame);

        // Assert
        assert_eq!(left_edge, Some(FramePoint::new(0, 0)));
        assert_eq!(centre, Some(FramePoint::new(500, 500)));
    }

    #[test]
    fn test_equal_aspect_scales_uniformly() {
        // 1280×720 and 1920×1080 share a 16:9 aspect → pure 1.5x scale
        let mapped = map_to_frame(
            Point::new(640.0, 360.0),
            Size::new(1280, 720),
            Size::new(1920, 1080),
        );
        assert_eq!(mapped, Some(FramePoint::new(960, 540)));
    }

    #[test]
    fn test_mapping_rounds_to_nearest_pixel() {
        // 1 viewport px = 1.5 frame px → 1.0 maps to 1.5, which rounds away from zero
        let mapped = map_to_frame(
            Point::new(1.0, 1.0),
            Size::new(1280, 720),
            Size::new(1920, 1080),
        );
        assert_eq!(mapped, Some(FramePoint::new(2, 2)));
    }

    #[test]
    fn test_empty_frame_returns_none() {
        let mapped = map_to_frame(Point::new(1.0, 1.0), Size::new(800, 600), Size::default());
        assert_eq!(mapped, None);
    }

    #[test]
    fn test_empty_viewport_returns_none() {
        let mapped = map_to_frame(Point::new(1.0, 1.0), Size::new(0, 600), Size::new(800, 600));
        assert_eq!(mapped, None);
    }

    #[test]
    fn test_mapping_is_idempotent_for_identical_input() {
        // Arrange: a spread of viewport/frame pairs including all three aspect cases
        let cases = [
            (Size::new(1000, 1000), Size::new(1920, 1080)),
            (Size::new(2560, 1080), Size::new(1920, 1080)),
            (Size::new(1280, 720), Size::new(3840, 2160)),
            (Size::new(333, 777), Size::new(1024, 768)),
        ];

        for (viewport, frame) in cases {
            let p = Point::new(123.4, 56.7);

            // Act
            let first = map_to_frame(p, viewport, frame);
            let second = map_to_frame(p, viewport, frame);

            // Assert
            assert_eq!(first, second, "mapping must be pure for {viewport:?} / {frame:?}");
        }
    }

    #[test]
    fn test_surface_map_delegates_to_map_to_frame() {
        let surface = Surface::new(Size::new(1000, 1000), Size::new(1920, 1080));
        assert_eq!(
            surface.map(Point::new(500.0, 500.0)),
            map_to_frame(Point::new(500.0, 500.0), surface.viewport, surface.frame)
        );
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(50.0, 50.0);
        let b = Point::new(80.0, 90.0);
        assert!((a.distance_to(b) - 50.0).abs() < f64::EPSILON);
    }
}
