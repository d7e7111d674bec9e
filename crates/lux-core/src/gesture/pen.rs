//! Stylus stroke tracking: duplicate suppression and the local preview trail.
//!
//! Pens report far more samples than the remote side can use, and many of
//! them are identical once rounded to frame pixels and whole degrees of tilt.
//! [`PenTracker::record`] drops a sample when every field equals the last one
//! actually sent.
//!
//! The preview trail is a short, local-only tail of recent viewport positions
//! drawn under the pen tip to hide round-trip latency.  It is never sent.

use std::collections::VecDeque;

use crate::domain::geometry::{FramePoint, Point};
use crate::gesture::intent::{Intent, PenSample};
use crate::gesture::thresholds::{PEN_PREVIEW_MAX_AGE_MS, PEN_PREVIEW_MAX_POINTS};

/// One point of the local preview trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewPoint {
    pub position: Point,
    pub pressure: f64,
    pub at_ms: u64,
}

/// Tracks the active stylus contact.
#[derive(Debug, Default)]
pub struct PenTracker {
    active: Option<u32>,
    last_sent: Option<PenSample>,
    preview: VecDeque<PreviewPoint>,
}

impl PenTracker {
    /// Contact id of the pen currently down, if any.
    pub fn active_id(&self) -> Option<u32> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts a new stroke for contact `id`.
    pub fn begin(&mut self, id: u32) {
        self.active = Some(id);
        self.preview.clear();
    }

    /// Records an in-contact sample.  Returns the intent to send, or `None`
    /// if it duplicates the previous one.
    pub fn record(&mut self, sample: PenSample, position: Point, now_ms: u64) -> Option<Intent> {
        self.push_preview(PreviewPoint {
            position,
            pressure: sample.pressure,
            at_ms: now_ms,
        });
        self.send_if_changed(sample)
    }

    /// Ends the stroke with a zero-pressure sample.
    ///
    /// `at` overrides the lift position; otherwise the last sent position is
    /// reused.  Returns `None` if nothing was ever sent for this stroke.
    pub fn lift(&mut self, at: Option<FramePoint>) -> Option<Intent> {
        self.active = None;
        self.preview.clear();
        let last = self.last_sent?;
        self.send_if_changed(PenSample {
            at: at.unwrap_or(last.at),
            pressure: 0.0,
            ..last
        })
    }

    /// Recent viewport positions, oldest first.
    pub fn preview(&self) -> impl Iterator<Item = &PreviewPoint> {
        self.preview.iter()
    }

    fn send_if_changed(&mut self, sample: PenSample) -> Option<Intent> {
        if self.last_sent == Some(sample) {
            return None;
        }
        self.last_sent = Some(sample);
        Some(Intent::Pen(sample))
    }

    fn push_preview(&mut self, point: PreviewPoint) {
        self.preview.push_back(point);
        while self.preview.len() > PEN_PREVIEW_MAX_POINTS {
            self.preview.pop_front();
        }
        while self
            .preview
            .front()
            .is_some_and(|p| p.at_ms + PEN_PREVIEW_MAX_AGE_MS < point.at_ms)
        {
            self.preview.pop_front();
        }
    }
}
