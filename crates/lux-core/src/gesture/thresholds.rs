//! Timing and distance thresholds for touchpad gesture classification.
//!
//! Distances are in viewport pixels, durations in milliseconds.

/// Longest touch that still counts as a single-finger tap.
pub const TAP_MAX_MS: u64 = 125;

/// How long a lone lifted contact lingers before its tap is committed.
///
/// A second finger arriving inside this window turns the gesture into a
/// two-finger gesture instead.
pub const LONE_TOUCH_LINGER_MS: u64 = 125;

/// Minimum gap after a right-click before a single tap is recognised again.
pub const RIGHT_CLICK_REARM_MS: u64 = 125;

/// Longest touch (per finger) that still counts as a two-finger tap.
pub const TWO_FINGER_TAP_MAX_MS: u64 = 250;

/// Maximum distance a finger may travel during a two-finger tap.
pub const TWO_FINGER_TAP_MAX_DISPLACEMENT: f64 = 25.0;

/// Minimum finger separation for a two-finger tap.
pub const TWO_FINGER_TAP_MIN_SEPARATION: f64 = 15.0;

/// Contacts younger than this produce no motion.
pub const JITTER_GUARD_MS: u64 = 25;

/// Two-finger motion inside this box (per axis) does not scroll.
pub const SCROLL_DEAD_ZONE: f64 = 15.0;

/// Pixels of finger travel → wheel units.
pub const SCROLL_GAIN: f64 = 8.0;

/// Pixels of finger travel → remote pointer pixels.
pub const TOUCHPAD_MOVE_GAIN: f64 = 1.5;

/// Contacts with a radius above this on either axis are palms.
pub const PALM_RADIUS: f64 = 75.0;

/// Contact count at which a three-finger drag begins.
pub const DRAG_CONTACTS: usize = 3;

/// Number of direct-touch slots on the remote side.
pub const TOUCH_SLOTS: u32 = 10;

/// Lowest pressure sent while a pen is in contact.  Zero means lifted.
pub const PEN_PRESSURE_FLOOR: f64 = 0.001;

/// Local pen-preview window: at most this many points…
pub const PEN_PREVIEW_MAX_POINTS: usize = 20;

/// …no older than this.
pub const PEN_PREVIEW_MAX_AGE_MS: u64 = 330;
