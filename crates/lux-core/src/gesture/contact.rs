//! Per-contact tracking state.

use crate::domain::geometry::Point;
use crate::input::ContactSample;

/// A tracked touch or stylus contact.
///
/// A contact that has been lifted but is still lingering (waiting to see
/// whether a second finger turns a tap into a two-finger gesture) keeps its
/// entry with `lifted_at` set.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: u32,
    pub origin: Point,
    pub current: Point,
    pub start_ms: u64,
    pub is_forceful: bool,
    pub lifted_at: Option<u64>,
    /// A remote `touchstart` went out for this contact, so its end must be
    /// forwarded too.
    pub start_sent: bool,
}

impl Contact {
    pub fn new(sample: &ContactSample, is_forceful: bool, now_ms: u64) -> Self {
        let p = sample.position();
        Self {
            id: sample.id,
            origin: p,
            current: p,
            start_ms: now_ms,
            is_forceful,
            lifted_at: None,
            start_sent: false,
        }
    }

    /// Still physically touching the surface.
    pub fn is_live(&self) -> bool {
        self.lifted_at.is_none()
    }

    /// Time in contact, up to `now_ms` or up to the lift if it already happened.
    pub fn duration(&self, now_ms: u64) -> u64 {
        self.lifted_at.unwrap_or(now_ms).saturating_sub(self.start_ms)
    }

    /// Time since touch-down regardless of lift.
    pub fn age(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    /// Straight-line distance from touch-down to the latest position.
    pub fn displacement(&self) -> f64 {
        self.origin.distance_to(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_stops_at_lift() {
        let mut c = Contact::new(&ContactSample::touch(1, 0.0, 0.0), false, 100);
        c.lifted_at = Some(180);
        assert_eq!(c.duration(500), 80);
        assert_eq!(c.age(500), 400);
        assert!(!c.is_live());
    }

    #[test]
    fn test_displacement_tracks_current_position() {
        let mut c = Contact::new(&ContactSample::touch(1, 0.0, 0.0), false, 0);
        c.current = Point::new(3.0, 4.0);
        assert_eq!(c.displacement(), 5.0);
    }
}
