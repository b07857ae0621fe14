//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Frame and timeout scheduling (`driver::FrameHost`)
//! - Press events to gestures (`input`)
//! - A virtual clock for tests and the native runner (`headless`)
//! - requestAnimationFrame / setTimeout in the browser (`web`)

pub mod driver;
pub mod headless;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::{Driver, FrameHost, TimerKind};
pub use headless::{ManualHost, Scripted, Simulation, plan_script};
pub use input::{Gesture, PressTracker};
