//! Lux client entry point.
//!
//! Wires the HTTP signaler, the WebSocket relay connector, and a stdin input
//! source into a [`SessionController`], then runs it until input ends, the
//! user presses Ctrl+C, or the session fails for good.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load ClientConfig (file) + Cli (flags / LUX_* env)
//!  └─ NdjsonInputSource(stdin) ──► input channel ──┐
//!  └─ SessionController::run ◄─────────────────────┘
//!       ├─ WsConnector    -- one relay transport per session
//!       ├─ HttpSignaler   -- POST /offer with the password
//!       └─ SessionEvent channel ──► log
//! ```
//!
//! Exits with a non-zero status when the session ends in an error (wrong
//! password, reconnect budget exhausted).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lux_client::application::session::{SessionController, SessionEvent, SessionPhase};
use lux_client::infrastructure::{
    config::{load_config, load_config_from, save_config, save_config_to, ClientConfig},
    input_source::NdjsonInputSource,
    signaling::HttpSignaler,
    ws_transport::WsConnector,
};
use lux_core::Size;

/// Capacity of the input event channel between the source and the session.
const INPUT_CHANNEL_CAPACITY: usize = 256;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Lux remote-desktop input client.
///
/// Reads input events as newline-delimited JSON on stdin and forwards them to
/// the remote host.
#[derive(Debug, Parser)]
#[command(name = "lux-client", about = "Remote-desktop input client", version)]
struct Cli {
    /// Remote host as `name[:port]`.  Overrides the config file.
    #[arg(long, env = "LUX_HOST")]
    host: Option<String>,

    /// Password for the remote host.  Never stored in the config file.
    #[arg(long, env = "LUX_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    /// Path to a config file instead of the platform default.
    #[arg(long, env = "LUX_CONFIG")]
    config: Option<PathBuf>,

    /// Watch the stream without sending input.
    #[arg(long, env = "LUX_VIEW_ONLY")]
    view_only: bool,

    /// Do not reconnect when the transport drops.
    #[arg(long, env = "LUX_NO_RECONNECT")]
    no_reconnect: bool,

    /// Initial width of the local video surface, in pixels.
    #[arg(long, default_value_t = 1280, env = "LUX_VIEWPORT_WIDTH")]
    viewport_width: u32,

    /// Initial height of the local video surface, in pixels.
    #[arg(long, default_value_t = 720, env = "LUX_VIEWPORT_HEIGHT")]
    viewport_height: u32,

    /// Write the effective settings (file plus overrides) to the config file
    /// and exit without connecting.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => load_config().context("failed to load config")?,
        };
        if let Some(host) = &self.host {
            config.connection.host = host.clone();
        }
        if self.view_only {
            config.connection.view_only = true;
        }
        if self.no_reconnect {
            config.connection.reconnect = false;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.client_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    if cli.save_config {
        match &cli.config {
            Some(path) => save_config_to(&config, path)
                .with_context(|| format!("failed to save config to {}", path.display()))?,
            None => save_config(&config).context("failed to save config")?,
        }
        info!("config saved");
        return Ok(());
    }

    info!(host = %config.connection.host, view_only = config.connection.view_only, "Lux client starting");

    // ── Shutdown ──────────────────────────────────────────────────────────────
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl+C received, shutting down");
                shutdown.cancel();
            }
        });
    }

    // ── Input source ──────────────────────────────────────────────────────────
    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        let source = NdjsonInputSource::new(BufReader::new(tokio::io::stdin()));
        match source.run(input_tx).await {
            Ok(count) => info!(count, "input source ended"),
            Err(e) => error!("input source failed: {e}"),
        }
    });

    // ── Session events ────────────────────────────────────────────────────────
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            log_session_event(&event);
        }
    });

    // ── Session ───────────────────────────────────────────────────────────────
    let session_config = config.session_config(
        cli.password.clone(),
        Size::new(cli.viewport_width, cli.viewport_height),
    );
    let controller = SessionController::new(
        session_config,
        Arc::new(WsConnector),
        Arc::new(HttpSignaler::new(&config.connection.host)),
        events_tx,
        shutdown,
    );

    controller
        .run(input_rx)
        .await
        .with_context(|| format!("session with {} ended", config.connection.host))?;

    info!("Lux client stopped");
    Ok(())
}

fn log_session_event(event: &SessionEvent) {
    match event {
        SessionEvent::PhaseChanged { session, phase: SessionPhase::Active } => {
            info!(%session, "session active");
        }
        SessionEvent::PhaseChanged { .. } => {}
        SessionEvent::FrameSize { width, height, .. } => info!(width, height, "remote frame size"),
        SessionEvent::HandshakeFailed { reason, .. } => error!("handshake failed: {reason}"),
        SessionEvent::Reconnecting { attempt, delay } => {
            warn!(attempt, "connection lost, reconnecting in {delay:?}");
        }
        SessionEvent::GaveUp { attempts } => error!(attempts, "giving up on reconnecting"),
    }
}
