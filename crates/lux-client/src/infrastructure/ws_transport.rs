//! WebSocket relay transport.
//!
//! The remote host answers the offer with the URL of a WebSocket relay.  Both
//! input channels are multiplexed over that one socket as JSON text frames:
//!
//! - **ordered** messages go through an unbounded in-order queue, so nothing
//!   is lost while the socket is busy;
//! - **unordered** messages go through a small bounded queue and are dropped
//!   when it is full.  A newer pointer delta or wheel tick always follows.
//!
//! The relay sends notices back on the same socket.  Only
//! `{"type":"frame","width":W,"height":H}` is understood; it becomes a
//! [`TransportEvent::MediaFrame`].
//!
//! # Tasks (for beginners)
//!
//! ```text
//!  send_ordered ──► ordered queue ───┐
//!                                    ├──► writer task ──► WebSocket sink
//!  send_unordered ─► unordered queue ┘
//!
//!  WebSocket stream ──► reader task ──► TransportEvent channel ──► session
//! ```
//!
//! Both tasks stop when the transport's cancellation token fires
//! ([`Transport::close`]) or the socket closes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use lux_core::{encode_message, Channel, RemoteMessage};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::application::session::SessionConfig;
use crate::application::transport::{
    Connection, Connector, SendError, Transport, TransportError, TransportEvent, TransportState,
};

/// Capacity of the best-effort queue.  Overflow is dropped.
pub const UNORDERED_QUEUE_CAPACITY: usize = 64;

/// Capacity of the transport → session event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Offer blob describing what this client wants from the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub transport: String,
    /// Input channels requested.  Empty for view-only sessions.
    pub channels: Vec<String>,
}

impl OfferDescriptor {
    pub fn new(with_input: bool) -> Self {
        let channels = if with_input {
            vec!["ordered".to_string(), "unordered".to_string()]
        } else {
            Vec::new()
        };
        Self {
            kind: "offer".to_string(),
            transport: "websocket".to_string(),
            channels,
        }
    }
}

/// The remote host's answer: where to find the relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerDescriptor {
    pub url: String,
}

/// Notices the relay may send us.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RelayNotice {
    Frame { width: u32, height: u32 },
}

/// Receiving ends of the outbound queues, handed to the writer task once.
struct PendingQueues {
    ordered: mpsc::UnboundedReceiver<String>,
    unordered: mpsc::Receiver<String>,
}

/// A [`Transport`] over a WebSocket relay.
pub struct WsTransport {
    offer: OfferDescriptor,
    open: Arc<AtomicBool>,
    ordered_tx: mpsc::UnboundedSender<String>,
    unordered_tx: mpsc::Sender<String>,
    queues: Mutex<Option<PendingQueues>>,
    events: mpsc::Sender<TransportEvent>,
    shutdown: CancellationToken,
}

impl WsTransport {
    /// Creates an unconnected transport and the receiver for its events.
    ///
    /// With `with_input` false no input channels are requested and sends are
    /// always rejected.
    pub fn new(with_input: bool) -> (Self, mpsc::Receiver<TransportEvent>) {
        let (ordered_tx, ordered) = mpsc::unbounded_channel();
        let (unordered_tx, unordered) = mpsc::channel(UNORDERED_QUEUE_CAPACITY);
        let (events, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let transport = Self {
            offer: OfferDescriptor::new(with_input),
            open: Arc::new(AtomicBool::new(false)),
            ordered_tx,
            unordered_tx,
            queues: Mutex::new(Some(PendingQueues { ordered, unordered })),
            events,
            shutdown: CancellationToken::new(),
        };
        (transport, events_rx)
    }

    fn has_input_channels(&self) -> bool {
        !self.offer.channels.is_empty()
    }

    fn check_open(&self, channel: Channel) -> Result<(), SendError> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(SendError::ChannelNotOpen(channel))
        }
    }

    async fn notify(&self, state: TransportState) {
        let _ = self.events.send(TransportEvent::StateChanged(state)).await;
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn send_ordered(&self, message: &RemoteMessage) -> Result<(), SendError> {
        self.check_open(Channel::Ordered)?;
        let text = encode_message(message).map_err(|e| SendError::Encode(e.to_string()))?;
        self.ordered_tx
            .send(text)
            .map_err(|_| SendError::ChannelNotOpen(Channel::Ordered))
    }

    fn send_unordered(&self, message: &RemoteMessage) -> Result<(), SendError> {
        self.check_open(Channel::Unordered)?;
        let text = encode_message(message).map_err(|e| SendError::Encode(e.to_string()))?;
        match self.unordered_tx.try_send(text) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!(kind = message.kind(), "unordered queue full, dropping");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(SendError::ChannelNotOpen(Channel::Unordered))
            }
        }
    }

    fn local_description(&self) -> String {
        // Serializing a struct of strings cannot fail.
        serde_json::to_string(&self.offer).unwrap_or_default()
    }

    async fn accept_answer(&self, answer: &str) -> Result<(), TransportError> {
        let answer: AnswerDescriptor =
            serde_json::from_str(answer).map_err(|e| TransportError::Answer(e.to_string()))?;
        let queues = self
            .queues
            .lock()
            .await
            .take()
            .ok_or_else(|| TransportError::Answer("answer already applied".to_string()))?;

        self.notify(TransportState::Connecting).await;
        let (ws, _response) = tokio_tungstenite::connect_async(answer.url.as_str())
            .await
            .map_err(|e| TransportError::Connect(format!("{}: {e}", answer.url)))?;
        info!(url = %answer.url, "relay connected");

        if self.has_input_channels() {
            self.open.store(true, Ordering::Release);
        }
        // Connected must precede any event the reader produces.
        self.notify(TransportState::Connected).await;

        let (sink, stream) = ws.split();
        tokio::spawn(write_loop(sink, queues, self.shutdown.clone(), Arc::clone(&self.open)));
        tokio::spawn(read_loop(
            stream,
            self.events.clone(),
            self.shutdown.clone(),
            Arc::clone(&self.open),
        ));
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.shutdown.cancel();
    }
}

async fn write_loop<S>(
    mut sink: S,
    mut queues: PendingQueues,
    shutdown: CancellationToken,
    open: Arc<AtomicBool>,
) where
    S: futures_util::Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    loop {
        let text = tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(text) = queues.ordered.recv() => text,
            Some(text) = queues.unordered.recv() => text,
            else => break,
        };
        if let Err(e) = sink.send(WsMessage::Text(text)).await {
            debug!("relay write failed: {e}");
            open.store(false, Ordering::Release);
            break;
        }
    }
    let _ = sink.close().await;
}

async fn read_loop<S, E>(
    mut stream: S,
    events: mpsc::Sender<TransportEvent>,
    shutdown: CancellationToken,
    open: Arc<AtomicBool>,
) where
    S: futures_util::Stream<Item = Result<WsMessage, E>> + Unpin,
    E: std::fmt::Display,
{
    let end_state = loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => return,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(WsMessage::Text(text))) => match serde_json::from_str::<RelayNotice>(&text) {
                Ok(RelayNotice::Frame { width, height }) => {
                    let _ = events.send(TransportEvent::MediaFrame { width, height }).await;
                }
                Err(e) => trace!("ignoring relay notice: {e}"),
            },
            Some(Ok(WsMessage::Close(_))) | None => break TransportState::Disconnected,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!("relay read failed: {e}");
                break TransportState::Failed;
            }
        }
    };
    open.store(false, Ordering::Release);
    let _ = events.send(TransportEvent::StateChanged(end_state)).await;
}

/// Creates a fresh [`WsTransport`] per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, config: &SessionConfig) -> Result<Connection, TransportError> {
        let (transport, events) = WsTransport::new(!config.view_only);
        Ok(Connection {
            transport: Arc::new(transport),
            events,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lux_core::{decode_message, MouseButton};
    use tokio::net::TcpListener;

    #[test]
    fn test_offer_requests_both_channels() {
        let (t, _rx) = WsTransport::new(true);
        let offer: serde_json::Value = serde_json::from_str(&t.local_description()).unwrap();
        assert_eq!(
            offer,
            serde_json::json!({
                "type": "offer",
                "transport": "websocket",
                "channels": ["ordered", "unordered"]
            })
        );
    }

    #[test]
    fn test_view_only_offer_requests_no_channels() {
        let (t, _rx) = WsTransport::new(false);
        let offer: OfferDescriptor = serde_json::from_str(&t.local_description()).unwrap();
        assert!(offer.channels.is_empty());
    }

    #[test]
    fn test_sends_rejected_before_answer() {
        let (t, _rx) = WsTransport::new(true);
        assert_eq!(
            t.send_ordered(&RemoteMessage::KeyDown { key: "KeyA".into() }),
            Err(SendError::ChannelNotOpen(Channel::Ordered))
        );
        assert_eq!(
            t.send_unordered(&RemoteMessage::MouseMove { x: 1, y: 1 }),
            Err(SendError::ChannelNotOpen(Channel::Unordered))
        );
    }

    #[tokio::test]
    async fn test_malformed_answer_is_rejected() {
        let (t, _rx) = WsTransport::new(true);
        let result = t.accept_answer("not json").await;
        assert!(matches!(result, Err(TransportError::Answer(_))));
    }

    #[tokio::test]
    async fn test_relay_round_trip() {
        // Arrange: a relay that announces a frame size and echoes back the first message
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let relay = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(WsMessage::Text(r#"{"type":"frame","width":1920,"height":1080}"#.to_string()))
                .await
                .unwrap();
            loop {
                match ws.next().await {
                    Some(Ok(WsMessage::Text(text))) => return text,
                    Some(Ok(_)) => continue,
                    other => panic!("relay expected a text frame, got {other:?}"),
                }
            }
        });
        let (t, mut events) = WsTransport::new(true);

        // Act
        let answer = format!(r#"{{"url":"ws://{addr}"}}"#);
        t.accept_answer(&answer).await.unwrap();
        t.send_ordered(&RemoteMessage::MouseDown { button: MouseButton::Left }).unwrap();
        let received = relay.await.unwrap();

        // Assert
        assert_eq!(
            decode_message(&received).unwrap(),
            RemoteMessage::MouseDown { button: MouseButton::Left }
        );
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::StateChanged(TransportState::Connecting))
        );
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::StateChanged(TransportState::Connected))
        );
        assert_eq!(
            events.recv().await,
            Some(TransportEvent::MediaFrame { width: 1920, height: 1080 })
        );
        t.close();
    }
}
