//! User-facing switches that change how gestures are translated.

use serde::{Deserialize, Serialize};

/// Input translation settings.
///
/// All fields have defaults so a partially-written config file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Render the cursor locally and send absolute positions.
    #[serde(default)]
    pub client_side_mouse: bool,
    /// Interpret finger contacts as a touchpad instead of forwarding them as touches.
    #[serde(default = "default_simulate_touchpad")]
    pub simulate_touchpad: bool,
    /// Invert two-finger scroll direction.
    #[serde(default)]
    pub natural_scrolling: bool,
    /// Multiplier applied to relative pointer motion.
    #[serde(default = "default_mouse_sensitivity")]
    pub mouse_sensitivity: f64,
    /// Exchange left and right mouse buttons.
    #[serde(default)]
    pub swap_buttons: bool,
    /// Touch contacts pressing harder than this are treated like a stylus.
    #[serde(default = "default_forceful_pressure_threshold")]
    pub forceful_pressure_threshold: f64,
}

fn default_simulate_touchpad() -> bool {
    true
}

fn default_mouse_sensitivity() -> f64 {
    1.0
}

fn default_forceful_pressure_threshold() -> f64 {
    // Finger pressure is normally reported in (0, 1]; only a stylus or an
    // explicit override can exceed it.
    1.0
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            client_side_mouse: false,
            simulate_touchpad: default_simulate_touchpad(),
            natural_scrolling: false,
            mouse_sensitivity: default_mouse_sensitivity(),
            swap_buttons: false,
            forceful_pressure_threshold: default_forceful_pressure_threshold(),
        }
    }
}
