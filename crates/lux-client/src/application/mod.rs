//! Application layer use cases for the client.
//!
//! # What does the client layer do?
//!
//! - **`transport`** – The ports the session loop talks through: the
//!   [`Transport`](transport::Transport) carrying input to the remote host,
//!   the [`Connector`](transport::Connector) that opens one, and the
//!   [`Signaler`](transport::Signaler) that performs the offer/answer
//!   exchange.
//!
//! - **`encode_input`** – Turns recognizer intents into wire messages and
//!   routes each to its ordered or unordered channel.
//!
//! - **`debounce`** – Wakes the recognizer when its tap/linger deadline
//!   passes.
//!
//! - **`session`** – The session lifecycle: connect, handshake, run input
//!   through the recognizer, and replace the session when the transport
//!   drops.

pub mod debounce;
pub mod encode_input;
pub mod session;
pub mod transport;
