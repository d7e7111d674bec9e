//! The gesture recognizer: raw input events in, classified [`Intent`]s out.
//!
//! # How it works (for beginners)
//!
//! A touchscreen only reports "finger N is at (x, y)".  Turning that into
//! clicks, scrolls and drags means remembering every contact since it touched
//! down and looking at *how many* fingers are down, *how long* they stayed,
//! and *how far* they moved.
//!
//! In touchpad-simulation mode the rules are:
//!
//! | Fingers | Gesture                                                     |
//! |---------|-------------------------------------------------------------|
//! | 1       | move → relative pointer motion; quick tap → left click      |
//! | 2       | move → scroll; quick tap → right click                      |
//! | 3+      | left button held, movement drags; lifting all releases it   |
//!
//! A single quick tap is not clicked immediately.  The lifted contact lingers
//! for [`LONE_TOUCH_LINGER_MS`] so that a second finger landing a moment later
//! can still turn the pair into a two-finger tap.  Only that right-click
//! swallows the tap: if the second finger turns out to be another tap or a
//! slide, the left click still goes out.  The recognizer never sleeps;
//! instead it exposes [`GestureRecognizer::pending_deadline`] and the owner
//! calls [`GestureRecognizer::on_timer`] once the deadline passes.
//!
//! Time is always passed in as `now_ms` from a monotonic clock, which keeps
//! the recognizer deterministic and trivially testable.
//!
//! In direct-touch mode contacts are forwarded one-to-one as remote touches.
//! A stylus (or any contact pressing harder than the configured threshold)
//! pre-empts every finger contact and streams `pen` samples in both modes.
//! In direct-touch mode it also drives the remote cursor: every sent sample
//! is preceded by an absolute move, and the left button is held from pen-down
//! to lift.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::domain::cursor::VirtualCursor;
use crate::domain::geometry::{Point, Size, Surface};
use crate::gesture::config::GestureConfig;
use crate::gesture::contact::Contact;
use crate::gesture::intent::{Intent, PenSample};
use crate::gesture::pen::{PenTracker, PreviewPoint};
use crate::gesture::thresholds::*;
use crate::input::{ContactSample, InputEvent, PointerKind};
use crate::protocol::messages::MouseButton;

/// A lone touch that ended and is waiting out the linger window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Linger {
    contact_id: u32,
    deadline_ms: u64,
    /// Whether expiry produces a left click.
    click: bool,
    /// A second finger landed while waiting.
    contested: bool,
}

/// Per-session gesture state machine.
#[derive(Debug)]
pub struct GestureRecognizer {
    config: GestureConfig,
    surface: Surface,
    cursor: VirtualCursor,
    /// Tracked contacts in touch-down order.
    contacts: Vec<Contact>,
    linger: Option<Linger>,
    last_right_click_ms: Option<u64>,
    held: BTreeSet<MouseButton>,
    drag_active: bool,
    scroll_anchor: Option<Point>,
    /// Sub-pixel remainder of relative motion not yet sent.
    residual: (f64, f64),
    pen: PenTracker,
}

impl GestureRecognizer {
    /// Creates a recognizer for a viewport of the given size.
    ///
    /// The frame size starts empty; absolute intents are withheld until
    /// [`set_frame_size`](Self::set_frame_size) is called.
    pub fn new(config: GestureConfig, viewport: Size) -> Self {
        Self {
            config,
            surface: Surface::new(viewport, Size::default()),
            cursor: VirtualCursor::new(viewport),
            contacts: Vec::new(),
            linger: None,
            last_right_click_ms: None,
            held: BTreeSet::new(),
            drag_active: false,
            scroll_anchor: None,
            residual: (0.0, 0.0),
            pen: PenTracker::default(),
        }
    }

    /// Builds the recognizer for a replacement session.
    ///
    /// Configuration, geometry and the virtual cursor carry over; contacts,
    /// held buttons, the pending tap and the pen stroke do not.
    pub fn successor(&self) -> Self {
        let mut next = Self::new(self.config.clone(), self.surface.viewport);
        next.surface = self.surface;
        next.cursor = self.cursor.clone();
        next
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn cursor(&self) -> &VirtualCursor {
        &self.cursor
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Buttons currently held down on the remote side.
    pub fn held_buttons(&self) -> impl Iterator<Item = MouseButton> + '_ {
        self.held.iter().copied()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_active
    }

    /// Local stylus preview trail.
    pub fn pen_preview(&self) -> impl Iterator<Item = &PreviewPoint> {
        self.pen.preview()
    }

    /// When [`on_timer`](Self::on_timer) next needs to run, if at all.
    pub fn pending_deadline(&self) -> Option<u64> {
        self.linger.map(|l| l.deadline_ms)
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.surface.viewport = viewport;
        self.cursor.resize(viewport);
    }

    pub fn set_frame_size(&mut self, frame: Size) {
        self.surface.frame = frame;
    }

    // ── Event entry points ────────────────────────────────────────────────────

    /// Classifies one raw event.
    pub fn handle(&mut self, event: &InputEvent, now_ms: u64) -> Vec<Intent> {
        let mut out = Vec::new();
        match event {
            InputEvent::MouseMove { dx, dy } => {
                let gain = self.config.mouse_sensitivity;
                self.relative_motion(dx * gain, dy * gain, &mut out);
            }
            InputEvent::MouseButton { button, pressed } => {
                let button = if self.config.swap_buttons {
                    button.swapped()
                } else {
                    *button
                };
                if *pressed {
                    self.press(button, &mut out);
                } else {
                    self.release(button, &mut out);
                }
            }
            InputEvent::Wheel { dx, dy } => out.push(Intent::Scroll { dx: *dx, dy: *dy }),
            InputEvent::Key { code, pressed } => out.push(Intent::Key {
                code: code.clone(),
                pressed: *pressed,
            }),
            InputEvent::TouchStart { contacts } => {
                for sample in contacts {
                    self.contact_start(sample, now_ms, &mut out);
                }
            }
            InputEvent::TouchMove { contacts } => self.contacts_moved(contacts, now_ms, &mut out),
            InputEvent::TouchEnd { contacts } => {
                for sample in contacts {
                    self.contact_end(sample.id, Some(sample.position()), now_ms, false, &mut out);
                }
            }
            InputEvent::TouchCancel { ids } => {
                for id in ids {
                    self.contact_end(*id, None, now_ms, true, &mut out);
                }
            }
            InputEvent::Resize { width, height } => {
                self.set_viewport(Size::new(*width, *height));
            }
        }
        out
    }

    /// Fires the lone-touch deadline if it has passed.
    pub fn on_timer(&mut self, now_ms: u64) -> Vec<Intent> {
        let mut out = Vec::new();
        let Some(linger) = self.linger else {
            return out;
        };
        if now_ms < linger.deadline_ms {
            return out;
        }
        self.settle_linger(&mut out);
        out
    }

    // ── Buttons and pointer ───────────────────────────────────────────────────

    fn press(&mut self, button: MouseButton, out: &mut Vec<Intent>) {
        if self.held.insert(button) {
            out.push(Intent::Press(button));
        }
    }

    fn release(&mut self, button: MouseButton, out: &mut Vec<Intent>) {
        if self.held.remove(&button) {
            out.push(Intent::Release(button));
        } else {
            trace!(?button, "suppressing release of a button that is not held");
        }
    }

    fn click(&mut self, button: MouseButton, out: &mut Vec<Intent>) {
        if self.held.contains(&button) {
            trace!(?button, "button already held, not clicking");
            return;
        }
        out.push(Intent::Click(button));
    }

    /// Resolves the pending tap now: drops the lingering contact and clicks
    /// if the tap qualified.
    fn settle_linger(&mut self, out: &mut Vec<Intent>) {
        let Some(linger) = self.linger.take() else {
            return;
        };
        self.contacts
            .retain(|c| c.id != linger.contact_id || c.is_live());
        if linger.click {
            debug!(contact = linger.contact_id, contested = linger.contested, "tap");
            self.click(MouseButton::Left, out);
        }
    }

    fn release_all(&mut self, out: &mut Vec<Intent>) {
        for button in std::mem::take(&mut self.held) {
            out.push(Intent::Release(button));
        }
    }

    fn relative_motion(&mut self, dx: f64, dy: f64, out: &mut Vec<Intent>) {
        if self.config.client_side_mouse {
            let position = self.cursor.move_by(dx, dy);
            if let Some(at) = self.surface.map(position) {
                out.push(Intent::MoveTo(at));
            }
            return;
        }

        let tx = dx + self.residual.0;
        let ty = dy + self.residual.1;
        let (rx, ry) = (tx.round(), ty.round());
        self.residual = (tx - rx, ty - ry);
        if rx != 0.0 || ry != 0.0 {
            out.push(Intent::Move {
                dx: rx as i32,
                dy: ry as i32,
            });
        }
    }

    // ── Contacts ──────────────────────────────────────────────────────────────

    fn is_forceful(&self, sample: &ContactSample) -> bool {
        sample.kind == PointerKind::Pen
            || sample.pressure > self.config.forceful_pressure_threshold
    }

    fn live_index(&self, id: u32) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == id && c.is_live())
    }

    fn live_touch_count(&self) -> usize {
        self.contacts
            .iter()
            .filter(|c| c.is_live() && !c.is_forceful)
            .count()
    }

    fn primary_index(&self) -> Option<usize> {
        self.contacts
            .iter()
            .position(|c| c.is_live() && !c.is_forceful)
    }

    fn contact_start(&mut self, sample: &ContactSample, now_ms: u64, out: &mut Vec<Intent>) {
        if self.is_forceful(sample) {
            self.pen_start(sample, now_ms, out);
            return;
        }
        if self.pen.is_active() {
            trace!(id = sample.id, "stylus active, ignoring touch");
            return;
        }
        if sample.radius_x > PALM_RADIUS || sample.radius_y > PALM_RADIUS {
            debug!(id = sample.id, rx = sample.radius_x, ry = sample.radius_y, "palm rejected");
            return;
        }
        if self.live_index(sample.id).is_some() {
            trace!(id = sample.id, "duplicate touch start");
            return;
        }
        // A reused id replaces its own lingering predecessor.
        self.contacts.retain(|c| c.id != sample.id);

        if self.config.simulate_touchpad {
            self.touchpad_start(sample, now_ms, out);
        } else {
            let mut contact = Contact::new(sample, false, now_ms);
            if let Some(at) = self.surface.map(sample.position()) {
                out.push(Intent::TouchStart {
                    slot: touch_slot(sample.id),
                    at,
                });
                contact.start_sent = true;
            }
            self.contacts.push(contact);
        }
    }

    fn touchpad_start(&mut self, sample: &ContactSample, now_ms: u64, out: &mut Vec<Intent>) {
        if let Some(linger) = self.linger.as_mut() {
            trace!(lingering = linger.contact_id, id = sample.id, "pending tap contested");
            linger.contested = true;
        }
        self.contacts.push(Contact::new(sample, false, now_ms));
        self.scroll_anchor = None;

        if !self.drag_active && self.live_touch_count() >= DRAG_CONTACTS {
            debug!("three-finger drag started");
            self.settle_linger(out);
            self.drag_active = true;
            if self.config.client_side_mouse {
                if let Some(at) = self.surface.map(self.cursor.position()) {
                    out.push(Intent::MoveTo(at));
                }
            }
            self.press(MouseButton::Left, out);
        }
    }

    fn contacts_moved(&mut self, samples: &[ContactSample], now_ms: u64, out: &mut Vec<Intent>) {
        let mut touchpad = Vec::new();
        for sample in samples {
            let Some(idx) = self.live_index(sample.id) else {
                continue;
            };
            if self.contacts[idx].is_forceful {
                self.contacts[idx].current = sample.position();
                self.pen_sample(sample, now_ms, out);
            } else if self.config.simulate_touchpad {
                touchpad.push(sample);
            } else {
                self.contacts[idx].current = sample.position();
                if let Some(at) = self.surface.map(sample.position()) {
                    out.push(Intent::TouchMove {
                        slot: touch_slot(sample.id),
                        at,
                    });
                }
            }
        }
        if !touchpad.is_empty() {
            self.touchpad_moved(&touchpad, now_ms, out);
        }
    }

    fn touchpad_moved(&mut self, samples: &[&ContactSample], now_ms: u64, out: &mut Vec<Intent>) {
        let Some(primary) = self.primary_index() else {
            return;
        };
        let before = self.contacts[primary].current;
        for sample in samples {
            if let Some(idx) = self.live_index(sample.id) {
                self.contacts[idx].current = sample.position();
            }
        }
        let after = self.contacts[primary].current;
        if before == after {
            return;
        }

        let settling = self
            .contacts
            .iter()
            .filter(|c| c.is_live() && !c.is_forceful)
            .any(|c| c.age(now_ms) < JITTER_GUARD_MS);
        if settling {
            trace!("contact younger than jitter guard, discarding motion");
            self.scroll_anchor = None;
            return;
        }

        if !self.drag_active && self.live_touch_count() == 2 {
            let anchor = *self.scroll_anchor.get_or_insert(before);
            let (dx, dy) = (after.x - anchor.x, after.y - anchor.y);
            if dx.abs() < SCROLL_DEAD_ZONE && dy.abs() < SCROLL_DEAD_ZONE {
                return;
            }
            let sign = if self.config.natural_scrolling { -1.0 } else { 1.0 };
            out.push(Intent::Scroll {
                dx: dx * SCROLL_GAIN * sign,
                dy: dy * SCROLL_GAIN * sign,
            });
            self.scroll_anchor = Some(after);
            return;
        }

        let gain = TOUCHPAD_MOVE_GAIN * self.config.mouse_sensitivity;
        self.relative_motion((after.x - before.x) * gain, (after.y - before.y) * gain, out);
    }

    fn contact_end(
        &mut self,
        id: u32,
        position: Option<Point>,
        now_ms: u64,
        cancelled: bool,
        out: &mut Vec<Intent>,
    ) {
        let Some(idx) = self.live_index(id) else {
            return;
        };
        if let Some(p) = position {
            self.contacts[idx].current = p;
        }

        if self.contacts[idx].is_forceful {
            self.pen_end(idx, position, out);
        } else if self.config.simulate_touchpad {
            self.touchpad_end(idx, now_ms, cancelled, out);
        } else if self.contacts.remove(idx).start_sent {
            out.push(Intent::TouchEnd {
                slot: touch_slot(id),
            });
        }
    }

    fn touchpad_end(&mut self, idx: usize, now_ms: u64, cancelled: bool, out: &mut Vec<Intent>) {
        let id = self.contacts[idx].id;
        let tracked = self.contacts.iter().filter(|c| !c.is_forceful).count();
        self.scroll_anchor = None;

        if self.drag_active {
            self.contacts.remove(idx);
            self.contacts.retain(Contact::is_live);
            if self.live_touch_count() == 0 {
                debug!("three-finger drag ended");
                self.drag_active = false;
                self.release(MouseButton::Left, out);
            }
            return;
        }

        if cancelled || tracked > 2 {
            self.contacts.remove(idx);
            self.contacts.retain(Contact::is_live);
            return;
        }

        if tracked == 2 {
            if self.is_two_finger_tap(now_ms) {
                debug!("two-finger tap");
                self.linger = None;
                self.contacts.remove(idx);
                self.contacts.retain(Contact::is_live);
                self.last_right_click_ms = Some(now_ms);
                self.click(MouseButton::Right, out);
                return;
            }
            if self.linger.is_none() {
                self.contacts.remove(idx);
                self.contacts.retain(Contact::is_live);
                return;
            }
            // The earlier tap stands on its own; this contact becomes the
            // new lone touch.
            self.settle_linger(out);
        }

        let Some(idx) = self.live_index(id) else {
            return;
        };
        let rearmed = self
            .last_right_click_ms
            .map_or(true, |t| now_ms.saturating_sub(t) >= RIGHT_CLICK_REARM_MS);
        let contact = &mut self.contacts[idx];
        let click = rearmed && contact.duration(now_ms) <= TAP_MAX_MS;
        contact.lifted_at = Some(now_ms);
        self.linger = Some(Linger {
            contact_id: contact.id,
            deadline_ms: now_ms + LONE_TOUCH_LINGER_MS,
            click,
            contested: false,
        });
    }

    fn is_two_finger_tap(&self, now_ms: u64) -> bool {
        let touches: Vec<&Contact> = self.contacts.iter().filter(|c| !c.is_forceful).collect();
        let [a, b] = touches.as_slice() else {
            return false;
        };
        [a, b].iter().all(|c| {
            c.duration(now_ms) <= TWO_FINGER_TAP_MAX_MS
                && c.displacement() <= TWO_FINGER_TAP_MAX_DISPLACEMENT
        }) && a.current.distance_to(b.current) >= TWO_FINGER_TAP_MIN_SEPARATION
    }

    // ── Stylus ────────────────────────────────────────────────────────────────

    fn pen_start(&mut self, sample: &ContactSample, now_ms: u64, out: &mut Vec<Intent>) {
        if let Some(active) = self.pen.active_id() {
            debug!(previous = active, id = sample.id, "second stylus lifts the first");
            if let Some(idx) = self.live_index(active) {
                self.pen_end(idx, None, out);
            }
        }

        // Everything a finger was doing stops here.
        self.linger = None;
        self.scroll_anchor = None;
        if self.config.simulate_touchpad {
            self.drag_active = false;
            self.release_all(out);
        } else {
            for contact in self
                .contacts
                .iter()
                .filter(|c| c.is_live() && !c.is_forceful && c.start_sent)
            {
                out.push(Intent::TouchEnd {
                    slot: touch_slot(contact.id),
                });
            }
        }
        self.contacts.retain(|c| c.is_forceful);

        self.contacts.push(Contact::new(sample, true, now_ms));
        self.pen.begin(sample.id);
        self.pen_sample(sample, now_ms, out);
        if !self.config.simulate_touchpad && self.surface.map(sample.position()).is_some() {
            self.press(MouseButton::Left, out);
        }
    }

    fn pen_sample(&mut self, sample: &ContactSample, now_ms: u64, out: &mut Vec<Intent>) {
        let position = sample.position();
        let Some(at) = self.surface.map(position) else {
            trace!(id = sample.id, "frame size unknown, dropping pen sample");
            return;
        };
        let pen = PenSample {
            at,
            pressure: sample.pressure.clamp(PEN_PRESSURE_FLOOR, 1.0),
            tilt_x: sample.tilt_x.round() as i32,
            tilt_y: sample.tilt_y.round() as i32,
        };
        let Some(intent) = self.pen.record(pen, position, now_ms) else {
            return;
        };
        if !self.config.simulate_touchpad {
            out.push(Intent::MoveTo(at));
        }
        out.push(intent);
    }

    fn pen_end(&mut self, idx: usize, position: Option<Point>, out: &mut Vec<Intent>) {
        let contact = self.contacts.remove(idx);
        if self.pen.active_id() == Some(contact.id) {
            let at = position.and_then(|p| self.surface.map(p));
            out.extend(self.pen.lift(at));
            if !self.config.simulate_touchpad {
                self.release(MouseButton::Left, out);
            }
        }
    }
}

fn touch_slot(id: u32) -> u8 {
    (id % TOUCH_SLOTS) as u8
}

// ── Tests ─────────────────────────────────────────────────────────────────────
