//! Ports to the outside world: the media/input transport and the signaling
//! round trip.
//!
//! The session loop depends only on these traits.  Infrastructure provides the
//! real implementations (`WsConnector`, `HttpSignaler`); tests provide
//! recording doubles.
//!
//! # Lifecycle of a transport (for beginners)
//!
//! ```text
//!  Connector::connect ──► Connection { transport, events }
//!        │
//!        ├─ transport.local_description()  ──► offer  ──► Signaler::exchange
//!        │                                                     │
//!        └─ transport.accept_answer(answer) ◄────── answer ◄───┘
//!                    │
//!                    ▼
//!    events: StateChanged(Connected), MediaFrame { .. }, … StateChanged(Failed)
//! ```
//!
//! Sending is synchronous and never waits: a message for a channel that is
//! not open yet (or any more) is rejected with [`SendError::ChannelNotOpen`].

use std::sync::Arc;

use async_trait::async_trait;
use lux_core::{Channel, RemoteMessage};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::application::session::SessionConfig;

/// Why a single send did not go out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The channel has not opened yet or has already closed.
    #[error("{0:?} channel is not open")]
    ChannelNotOpen(Channel),
    /// The message could not be encoded.
    #[error("failed to encode message: {0}")]
    Encode(String),
}

/// Transport setup failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport could not be created.
    #[error("failed to open transport: {0}")]
    Connect(String),
    /// The remote answer could not be applied.
    #[error("failed to apply remote answer: {0}")]
    Answer(String),
}

/// Signaling failures.  All of them end the session for good.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandshakeError {
    /// The request never got a response.
    #[error("signaling request failed: {0}")]
    Request(String),
    /// The remote side refused the offer; the string is its error text.
    #[error("remote rejected the offer: {0}")]
    Rejected(String),
    /// The response did not contain a usable answer.
    #[error("malformed answer: {0}")]
    Malformed(String),
}

/// Coarse connection state reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Asynchronous notifications from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    StateChanged(TransportState),
    /// The remote video stream has (re)negotiated to this frame size.
    MediaFrame { width: u32, height: u32 },
}

/// The input half of an open transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends on the reliable, in-order channel.
    fn send_ordered(&self, message: &RemoteMessage) -> Result<(), SendError>;

    /// Sends on the best-effort channel.
    fn send_unordered(&self, message: &RemoteMessage) -> Result<(), SendError>;

    /// Offer blob to hand to the signaler.
    fn local_description(&self) -> String;

    /// Applies the remote answer and starts opening channels.
    async fn accept_answer(&self, answer: &str) -> Result<(), TransportError>;

    /// Tears the transport down.  Idempotent.
    fn close(&self);
}

/// A freshly created transport and its event stream.
pub struct Connection {
    pub transport: Arc<dyn Transport>,
    pub events: mpsc::Receiver<TransportEvent>,
}

/// Creates transports.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &SessionConfig) -> Result<Connection, TransportError>;
}

/// Credential and offer sent to the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub password: String,
    /// The transport's local description, unencoded.
    pub offer: String,
}

/// The remote host's answer description, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeAnswer {
    pub description: String,
}

/// Performs the one-shot offer/answer exchange.
#[async_trait]
pub trait Signaler: Send + Sync {
    async fn exchange(&self, request: HandshakeRequest) -> Result<HandshakeAnswer, HandshakeError>;
}
