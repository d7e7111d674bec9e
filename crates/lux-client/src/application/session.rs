//! SessionController: owns one remote session at a time and replaces it when
//! the transport drops.
//!
//! # Session lifecycle (for beginners)
//!
//! ```text
//!            connect + handshake
//!  Connecting ───────────────────► Active
//!      │                             │
//!      │ transport failed            │ transport failed / disconnected
//!      ▼                             ▼
//!   Degraded ◄───────────────────────┘
//!      │ cancel session token, close transport
//!      ▼
//!    Closed ──► (reconnect policy) ──► new session, Connecting
//! ```
//!
//! Everything that mutates gesture or cursor state happens on the single task
//! running [`SessionController::run`], so no locking is needed.  Each session
//! owns a child [`CancellationToken`] of the controller's root token; cancelling
//! it detaches the gesture timer and every other listener of that session at
//! once.
//!
//! A handshake failure (wrong password, malformed answer) is terminal.  A
//! transport failure is not: the next session starts from
//! [`GestureRecognizer::successor`], so the cursor position and settings carry
//! over while all in-flight gesture state is discarded.

use std::sync::Arc;
use std::time::Duration;

use lux_core::{GestureConfig, GestureRecognizer, InputEvent, Size};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::application::debounce::DebounceTimer;
use crate::application::encode_input::ProtocolEncoder;
use crate::application::transport::{
    Connection, Connector, HandshakeError, HandshakeRequest, Signaler, TransportError,
    TransportEvent, TransportState,
};

/// Default pause between a dropped session and the next connect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Lifecycle phase of a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Active,
    Degraded,
    Closed,
}

/// Notifications for whoever presents the session to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged { session: Uuid, phase: SessionPhase },
    /// The remote frame size changed; the front end should resize its surface.
    FrameSize { session: Uuid, width: u32, height: u32 },
    HandshakeFailed { session: Uuid, reason: String },
    Reconnecting { attempt: u32, delay: Duration },
    GaveUp { attempts: u32 },
}

/// Terminal outcomes of [`SessionController::run`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("handshake failed: {0}")]
    Handshake(#[from] HandshakeError),
    #[error("gave up after {0} reconnect attempts")]
    ReconnectLimit(u32),
    #[error("disconnected and reconnecting is disabled")]
    Disconnected,
}

/// Everything needed to open and run a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub password: String,
    /// Watch the stream without sending any input.
    pub view_only: bool,
    pub gesture: GestureConfig,
    /// Initial size of the local video surface.
    pub viewport: Size,
    pub reconnect: bool,
    pub reconnect_delay: Duration,
    /// 0 means unlimited.
    pub max_reconnect_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            view_only: false,
            gesture: GestureConfig::default(),
            viewport: Size::new(1280, 720),
            reconnect: true,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: 0,
        }
    }
}

/// Milliseconds since the controller was created, for the recognizer.
struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    fn new() -> Self {
        Self { origin: Instant::now() }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// How a single session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOutcome {
    /// The transport dropped.  A replacement may follow.
    Degraded { reached_active: bool },
    /// Input ended or shutdown was requested.
    Finished,
}

/// Drives sessions until input ends, shutdown is requested, or a terminal
/// error occurs.
pub struct SessionController {
    config: SessionConfig,
    connector: Arc<dyn Connector>,
    signaler: Arc<dyn Signaler>,
    events: mpsc::UnboundedSender<SessionEvent>,
    shutdown: CancellationToken,
    clock: SessionClock,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn Connector>,
        signaler: Arc<dyn Signaler>,
        events: mpsc::UnboundedSender<SessionEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            connector,
            signaler,
            events,
            shutdown,
            clock: SessionClock::new(),
        }
    }

    /// Runs sessions back to back, feeding them `input`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Handshake`] when the remote side rejects the offer.
    /// - [`SessionError::Disconnected`] when the transport drops and
    ///   reconnecting is disabled.
    /// - [`SessionError::ReconnectLimit`] when the attempt budget runs out.
    pub async fn run(self, mut input: mpsc::Receiver<InputEvent>) -> Result<(), SessionError> {
        let mut recognizer = GestureRecognizer::new(self.config.gesture.clone(), self.config.viewport);
        let mut attempts: u32 = 0;

        loop {
            match self.run_session(&mut recognizer, &mut input).await? {
                SessionOutcome::Finished => return Ok(()),
                SessionOutcome::Degraded { reached_active } => {
                    if !self.config.reconnect {
                        return Err(SessionError::Disconnected);
                    }
                    if reached_active {
                        attempts = 0;
                    }
                    attempts += 1;

                    let max = self.config.max_reconnect_attempts;
                    if max > 0 && attempts > max {
                        warn!(attempts, "reconnect budget exhausted");
                        self.emit(SessionEvent::GaveUp { attempts });
                        return Err(SessionError::ReconnectLimit(max));
                    }

                    let delay = self.config.reconnect_delay;
                    info!(attempt = attempts, ?delay, "reconnecting");
                    self.emit(SessionEvent::Reconnecting { attempt: attempts, delay });
                    if !self.wait_before_reconnect(&mut recognizer, &mut input, delay).await {
                        return Ok(());
                    }
                    recognizer = recognizer.successor();
                }
            }
        }
    }

    /// Sleeps out the reconnect delay while discarding input.
    ///
    /// Returns `false` if input ended or shutdown was requested meanwhile.
    async fn wait_before_reconnect(
        &self,
        recognizer: &mut GestureRecognizer,
        input: &mut mpsc::Receiver<InputEvent>,
        delay: Duration,
    ) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return false,
                _ = &mut sleep => return true,
                event = input.recv() => match event {
                    None => return false,
                    Some(InputEvent::Resize { width, height }) => {
                        recognizer.set_viewport(Size::new(width, height));
                    }
                    Some(_) => trace!("no session, discarding input"),
                },
            }
        }
    }

    async fn run_session(
        &self,
        recognizer: &mut GestureRecognizer,
        input: &mut mpsc::Receiver<InputEvent>,
    ) -> Result<SessionOutcome, SessionError> {
        let id = Uuid::new_v4();
        let token = self.shutdown.child_token();
        self.set_phase(id, SessionPhase::Connecting);

        let connected = tokio::select! {
            _ = token.cancelled() => None,
            result = self.connector.connect(&self.config) => Some(result),
        };
        let Connection { transport, mut events } = match connected {
            None => {
                self.set_phase(id, SessionPhase::Closed);
                return Ok(SessionOutcome::Finished);
            }
            Some(Err(e)) => {
                warn!(session = %id, "connect failed: {e}");
                self.set_phase(id, SessionPhase::Degraded);
                self.set_phase(id, SessionPhase::Closed);
                return Ok(SessionOutcome::Degraded { reached_active: false });
            }
            Some(Ok(connection)) => connection,
        };

        let encoder = (!self.config.view_only).then(|| ProtocolEncoder::new(Arc::clone(&transport)));
        let (timer_tx, mut timer_rx) = mpsc::unbounded_channel();
        let mut timer = DebounceTimer::new(token.clone(), timer_tx);

        let handshake = {
            let signaler = Arc::clone(&self.signaler);
            let transport = Arc::clone(&transport);
            let request = HandshakeRequest {
                password: self.config.password.clone(),
                offer: transport.local_description(),
            };
            async move {
                let answer = signaler.exchange(request).await?;
                transport.accept_answer(&answer.description).await?;
                Ok::<(), SessionError>(())
            }
        };
        tokio::pin!(handshake);
        let mut handshake_done = false;
        let mut reached_active = false;

        let outcome = loop {
            tokio::select! {
                _ = token.cancelled() => break Ok(SessionOutcome::Finished),

                result = &mut handshake, if !handshake_done => {
                    handshake_done = true;
                    match result {
                        Ok(()) => debug!(session = %id, "answer applied"),
                        Err(SessionError::Handshake(e)) => {
                            warn!(session = %id, "handshake failed: {e}");
                            self.emit(SessionEvent::HandshakeFailed { session: id, reason: e.to_string() });
                            break Err(SessionError::Handshake(e));
                        }
                        Err(e) => {
                            warn!(session = %id, "{e}");
                            break Ok(SessionOutcome::Degraded { reached_active });
                        }
                    }
                }

                event = events.recv() => match event {
                    Some(TransportEvent::StateChanged(TransportState::Connected)) => {
                        if !reached_active {
                            reached_active = true;
                            self.set_phase(id, SessionPhase::Active);
                        }
                    }
                    Some(TransportEvent::StateChanged(TransportState::Connecting)) => {}
                    Some(TransportEvent::StateChanged(state)) => {
                        info!(session = %id, ?state, "transport dropped");
                        break Ok(SessionOutcome::Degraded { reached_active });
                    }
                    Some(TransportEvent::MediaFrame { width, height }) => {
                        debug!(session = %id, width, height, "remote frame size");
                        recognizer.set_frame_size(Size::new(width, height));
                        self.emit(SessionEvent::FrameSize { session: id, width, height });
                    }
                    None => {
                        info!(session = %id, "transport event stream ended");
                        break Ok(SessionOutcome::Degraded { reached_active });
                    }
                },

                Some(fired) = timer_rx.recv() => {
                    let intents = recognizer.on_timer(self.clock.now_ms().max(fired));
                    if let Some(encoder) = &encoder {
                        encoder.dispatch(intents);
                    }
                }

                event = input.recv() => match event {
                    None => {
                        info!(session = %id, "input source ended");
                        break Ok(SessionOutcome::Finished);
                    }
                    Some(event) => self.apply_input(recognizer, encoder.as_ref(), &event),
                },
            }
            timer.sync(recognizer.pending_deadline(), self.clock.now_ms());
        };

        timer.cancel();
        token.cancel();
        transport.close();
        if matches!(outcome, Ok(SessionOutcome::Degraded { .. })) {
            self.set_phase(id, SessionPhase::Degraded);
        }
        self.set_phase(id, SessionPhase::Closed);
        outcome
    }

    fn apply_input(
        &self,
        recognizer: &mut GestureRecognizer,
        encoder: Option<&ProtocolEncoder>,
        event: &InputEvent,
    ) {
        match encoder {
            Some(encoder) => {
                let intents = recognizer.handle(event, self.clock.now_ms());
                encoder.dispatch(intents);
            }
            None => {
                if let InputEvent::Resize { width, height } = event {
                    recognizer.set_viewport(Size::new(*width, *height));
                }
            }
        }
    }

    fn set_phase(&self, session: Uuid, phase: SessionPhase) {
        info!(session = %session, ?phase, "session phase");
        self.emit(SessionEvent::PhaseChanged { session, phase });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
