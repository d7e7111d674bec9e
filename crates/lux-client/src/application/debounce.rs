//! DebounceTimer: a single re-armable wake-up for the gesture recognizer.
//!
//! The recognizer is clock-free: it exposes `pending_deadline()` and expects
//! `on_timer(now)` to be called once that instant has passed.  This timer
//! turns the deadline into a message on a channel the session loop already
//! selects on.
//!
//! At most one wake-up is outstanding.  Re-arming to a new deadline cancels
//! the previous one, and cancelling the parent token (session teardown)
//! cancels whatever is pending.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Fires the recognizer's pending deadline back into the session loop.
pub struct DebounceTimer {
    parent: CancellationToken,
    fired: mpsc::UnboundedSender<u64>,
    armed: Option<(u64, CancellationToken)>,
}

impl DebounceTimer {
    /// Creates an idle timer.  Fired deadlines (in session milliseconds) are
    /// sent on `fired`.
    pub fn new(parent: CancellationToken, fired: mpsc::UnboundedSender<u64>) -> Self {
        Self { parent, fired, armed: None }
    }

    /// The deadline currently armed, if any.
    pub fn armed_deadline(&self) -> Option<u64> {
        self.armed.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Matches the timer to `deadline`.
    ///
    /// Unchanged deadlines leave the running wake-up alone; `None` disarms.
    pub fn sync(&mut self, deadline: Option<u64>, now_ms: u64) {
        if self.armed_deadline() == deadline {
            return;
        }
        self.cancel();

        let Some(deadline) = deadline else {
            return;
        };

        let token = self.parent.child_token();
        let delay = Duration::from_millis(deadline.saturating_sub(now_ms));
        let fired = self.fired.clone();
        let task_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    trace!(deadline, "gesture timer fired");
                    let _ = fired.send(deadline);
                }
            }
        });
        self.armed = Some((deadline, token));
    }

    /// Disarms the pending wake-up, if any.
    pub fn cancel(&mut self) {
        if let Some((_, token)) = self.armed.take() {
            token.cancel();
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
