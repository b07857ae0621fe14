//! Raw press events to discrete gestures
//!
//! A press released before the long-press delay is a tap. A press held past
//! the delay fires one long-press while still down, and its release is
//! swallowed.

use crate::consts::LONG_PRESS_MS;

/// Gestures delivered to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    started_ms: f64,
    long_fired: bool,
}

#[derive(Debug, Clone)]
pub struct PressTracker {
    long_press_ms: f64,
    current: Option<Press>,
}

impl Default for PressTracker {
    fn default() -> Self {
        Self::new(LONG_PRESS_MS)
    }
}

impl PressTracker {
    pub fn new(long_press_ms: f64) -> Self {
        Self {
            long_press_ms,
            current: None,
        }
    }

    pub fn long_press_ms(&self) -> f64 {
        self.long_press_ms
    }

    pub fn is_pressed(&self) -> bool {
        self.current.is_some()
    }

    /// Pointer went down. A press already in progress is replaced.
    pub fn press(&mut self, now_ms: f64) {
        self.current = Some(Press {
            started_ms: now_ms,
            long_fired: false,
        });
    }

    /// Pointer went up
    pub fn release(&mut self, now_ms: f64) -> Option<Gesture> {
        let press = self.current.take()?;
        if press.long_fired {
            return None;
        }
        // Released late without the long-press ever being polled
        if now_ms - press.started_ms >= self.long_press_ms {
            return Some(Gesture::LongPress);
        }
        Some(Gesture::Tap)
    }

    /// Long-press once the hold reaches the delay; at most once per press
    pub fn long_press_due(&mut self, now_ms: f64) -> Option<Gesture> {
        let press = self.current.as_mut()?;
        if press.long_fired || now_ms - press.started_ms < self.long_press_ms {
            return None;
        }
        press.long_fired = true;
        Some(Gesture::LongPress)
    }

    /// Long-press now, for hosts whose own timer already measured the hold
    pub fn fire_long_press(&mut self) -> Option<Gesture> {
        let press = self.current.as_mut()?;
        if press.long_fired {
            return None;
        }
        press.long_fired = true;
        Some(Gesture::LongPress)
    }

    /// Pointer left or was cancelled
    pub fn cancel(&mut self) {
        self.current = None;
    }
}
