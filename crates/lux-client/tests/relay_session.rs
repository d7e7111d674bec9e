//! End-to-end test of a session over the real HTTP signaler and WebSocket
//! relay transport.
//!
//! # What is being tested?
//!
//! A fake remote host runs on localhost:
//!
//! ```text
//! SessionController                      fake host
//! ─────────────────                      ─────────
//! POST /offer {password, offer}  ──────► checks password
//!                                ◄────── {"Offer": base64({"url": ws://relay})}
//! WebSocket connect              ──────► relay
//!                                ◄────── {"type":"frame","width":1920,"height":1080}
//! mousedown / mouseup            ──────► relay records them
//! ```
//!
//! The session must authenticate, report the remote frame size, and deliver
//! a mouse click in order on the ordered channel.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

use lux_client::application::session::{SessionConfig, SessionController, SessionError, SessionEvent};
use lux_client::application::transport::HandshakeError;
use lux_client::infrastructure::signaling::HttpSignaler;
use lux_client::infrastructure::ws_transport::WsConnector;
use lux_core::{decode_message, InputEvent, MouseButton, RemoteMessage, Size};

const PASSWORD: &str = "correct horse";

/// Answers one `POST /offer`; returns the JSON body the client sent.
async fn serve_offer(listener: TcpListener, relay_url: String) -> serde_json::Value {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    let body_start = loop {
        let n = socket.read(&mut buf).await.unwrap();
        request.extend_from_slice(&buf[..n]);
        if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let headers = String::from_utf8_lossy(&request[..body_start]).to_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or(0);
    while request.len() < body_start + content_length {
        let n = socket.read(&mut buf).await.unwrap();
        request.extend_from_slice(&buf[..n]);
    }
    let body: serde_json::Value = serde_json::from_slice(&request[body_start..]).unwrap();

    let (status, reply) = if body["password"] == PASSWORD {
        let answer = serde_json::json!({ "url": relay_url }).to_string();
        ("200 OK", serde_json::json!({ "Offer": BASE64_STANDARD.encode(answer) }).to_string())
    } else {
        ("403 Forbidden", "Invalid password".to_string())
    };
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
        reply.len()
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    body
}

/// Accepts one relay connection, announces a frame size, and collects
/// `count` messages.
async fn serve_relay(listener: TcpListener, count: usize) -> Vec<RemoteMessage> {
    let (tcp, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
    ws.send(WsMessage::Text(r#"{"type":"frame","width":1920,"height":1080}"#.to_string()))
        .await
        .unwrap();

    let mut received = Vec::new();
    while received.len() < count {
        match ws.next().await {
            Some(Ok(WsMessage::Text(text))) => received.push(decode_message(&text).unwrap()),
            Some(Ok(_)) => {}
            other => panic!("relay closed early: {other:?}"),
        }
    }
    received
}

fn controller(
    host: &str,
    password: &str,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> SessionController {
    let config = SessionConfig {
        password: password.to_string(),
        viewport: Size::new(1000, 1000),
        reconnect: false,
        ..SessionConfig::default()
    };
    SessionController::new(
        config,
        Arc::new(WsConnector),
        Arc::new(HttpSignaler::new(host)),
        events,
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn test_click_travels_through_relay() {
    // Arrange
    let http = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let relay = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = http.local_addr().unwrap().to_string();
    let relay_url = format!("ws://{}", relay.local_addr().unwrap());
    let offer_server = tokio::spawn(serve_offer(http, relay_url));
    let relay_server = tokio::spawn(serve_relay(relay, 2));

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (input_tx, input_rx) = mpsc::channel(16);
    let run = tokio::spawn(controller(&host, PASSWORD, events_tx).run(input_rx));

    // Wait until the relay's frame notice arrives; the channels are open by then.
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = events_rx.recv().await {
            if let SessionEvent::FrameSize { width, height, .. } = event {
                assert_eq!((width, height), (1920, 1080));
                return;
            }
        }
        panic!("session events ended before the frame size arrived");
    })
    .await
    .expect("frame size within timeout");

    // Act
    input_tx
        .send(InputEvent::MouseButton { button: MouseButton::Left, pressed: true })
        .await
        .unwrap();
    input_tx
        .send(InputEvent::MouseButton { button: MouseButton::Left, pressed: false })
        .await
        .unwrap();
    let received = tokio::time::timeout(Duration::from_secs(10), relay_server)
        .await
        .expect("relay within timeout")
        .unwrap();
    drop(input_tx);

    // Assert
    assert_eq!(
        received,
        vec![
            RemoteMessage::MouseDown { button: MouseButton::Left },
            RemoteMessage::MouseUp { button: MouseButton::Left },
        ]
    );
    let offer = offer_server.await.unwrap();
    assert_eq!(offer["password"], PASSWORD);
    let decoded = BASE64_STANDARD.decode(offer["offer"].as_str().unwrap()).unwrap();
    let descriptor: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
    assert_eq!(descriptor["transport"], "websocket");
    assert!(tokio::time::timeout(Duration::from_secs(10), run).await.is_ok());
}

#[tokio::test]
async fn test_wrong_password_ends_with_handshake_error() {
    // Arrange
    let http = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = http.local_addr().unwrap().to_string();
    let offer_server = tokio::spawn(serve_offer(http, "ws://127.0.0.1:9".to_string()));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (_input_tx, input_rx) = mpsc::channel(16);

    // Act
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        controller(&host, "guess", events_tx).run(input_rx),
    )
    .await
    .expect("session ends within timeout");

    // Assert
    assert!(matches!(
        result,
        Err(SessionError::Handshake(HandshakeError::Rejected(ref text))) if text == "Invalid password"
    ));
    offer_server.await.unwrap();
    let mut saw_failure = false;
    while let Ok(event) = events_rx.try_recv() {
        saw_failure |= matches!(event, SessionEvent::HandshakeFailed { .. });
    }
    assert!(saw_failure);
}
