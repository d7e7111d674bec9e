//! Gesture recognition: contacts, thresholds, and the recognizer state machine.

pub mod config;
pub mod contact;
pub mod intent;
pub mod pen;
pub mod recognizer;
pub mod thresholds;

pub use config::GestureConfig;
pub use contact::Contact;
pub use intent::{Intent, PenSample};
pub use pen::PreviewPoint;
pub use recognizer::GestureRecognizer;
