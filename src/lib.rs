//! Bounce Tap - a colored square bouncing around the screen
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, wall bounces, gesture state)
//! - `platform`: Host scheduling, press tracking, headless and browser hosts
//! - `renderer`: WebGPU rendering of the square
//! - `settings`: Data-driven tuning loaded at startup

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};
pub use sim::{Bouncer, RenderSnapshot};

/// Simulation constants
pub mod consts {
    /// Side length of the square (pixels)
    pub const SQUARE_SIZE: f32 = 50.0;

    /// Base velocity before the speed factor is applied (pixels per tick)
    pub const INITIAL_VELOCITY_X: f32 = 2.0;
    pub const INITIAL_VELOCITY_Y: f32 = 3.0;

    /// Speed factor bounds
    pub const MIN_SPEED_FACTOR: u8 = 0;
    pub const MAX_SPEED_FACTOR: u8 = 5;
    pub const INITIAL_SPEED_FACTOR: u8 = 1;

    /// Two taps closer than this are a double-tap; an isolated tap toggles after it
    pub const DOUBLE_TAP_WINDOW_MS: f64 = 200.0;
    /// Hold time before a press becomes a long-press
    pub const LONG_PRESS_MS: f64 = 500.0;

    /// Frame interval used by the headless host (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}

/// HUD text for the current speed factor
pub fn speed_label(speed_factor: u8) -> String {
    format!(
        "Current Speed ({}-{}): {}",
        consts::MIN_SPEED_FACTOR,
        consts::MAX_SPEED_FACTOR,
        speed_factor
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_label() {
        assert_eq!(speed_label(3), "Current Speed (0-5): 3");
    }
}
