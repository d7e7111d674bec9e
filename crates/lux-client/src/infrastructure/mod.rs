//! Infrastructure layer for the client.
//!
//! Concrete adapters behind the application layer's ports.
//!
//! **Dependency rule**: this layer may depend on `application` and `lux_core`,
//! but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`ws_transport`** – [`WsConnector`](ws_transport::WsConnector) and the
//!   WebSocket relay transport that multiplexes the ordered and unordered
//!   input channels over one socket.
//!
//! - **`signaling`** – [`HttpSignaler`](signaling::HttpSignaler), the
//!   password-authenticated `POST /offer` exchange.
//!
//! - **`input_source`** – reads newline-delimited JSON input events from any
//!   async reader (stdin in the binary).
//!
//! - **`config`** – the TOML config file and its platform location.

pub mod config;
pub mod input_source;
pub mod signaling;
pub mod ws_transport;
