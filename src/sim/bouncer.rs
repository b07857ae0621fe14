//! The bouncing square component
//!
//! Owns the square, the motion/speed state and the gesture state, and is
//! driven by two kinds of input: one `tick()` per frame and discrete
//! gestures. A single owner mutates it synchronously; the host reads a
//! [`RenderSnapshot`] after each update.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::gesture::{GestureState, PendingTap, TapOutcome, TimerId};
use super::state::{Color, SimulationState, Square, Viewport};
use super::tick::{TickReport, advance};
use crate::settings::Settings;

/// What the host paints after an update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub x: f32,
    pub y: f32,
    pub side: f32,
    pub color: Color,
    pub color_hex: String,
    pub speed_factor: u8,
    pub moving: bool,
}

#[derive(Debug, Clone)]
pub struct Bouncer {
    viewport: Viewport,
    square: Square,
    state: SimulationState,
    gestures: GestureState,
    rng: Pcg32,
    double_tap_window_ms: f64,
    ticks: u64,
    bounces: u64,
    stopped: bool,
}

impl Bouncer {
    /// Spawn the square at a random position with a random color
    pub fn new(viewport: Viewport, settings: &Settings, seed: u64) -> Self {
        if viewport.is_degenerate(settings.square_size) {
            log::warn!(
                "Viewport {}x{} cannot fit a {}px square; pinning it at the origin",
                viewport.width,
                viewport.height,
                settings.square_size
            );
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let vel = Vec2::from(settings.base_velocity);
        let square = Square::spawn(&viewport, settings.square_size, vel, &mut rng);
        let state = SimulationState::new(settings.start_moving, settings.initial_speed);

        log::info!(
            "Square spawned at ({:.1}, {:.1}) color {} seed {}",
            square.pos.x,
            square.pos.y,
            square.color.to_hex(),
            seed
        );

        Self {
            viewport,
            square,
            state,
            gestures: GestureState::new(),
            rng,
            double_tap_window_ms: settings.double_tap_window_ms,
            ticks: 0,
            bounces: 0,
            stopped: false,
        }
    }

    /// Advance one frame. Does nothing while paused or after `stop()`.
    pub fn tick(&mut self) -> TickReport {
        if self.stopped || !self.state.moving {
            return TickReport::default();
        }

        let report = advance(
            &mut self.square,
            &self.viewport,
            self.state.speed_factor(),
            &mut self.rng,
        );
        self.ticks += 1;

        if report.bounced() {
            self.bounces += 1;
            log::debug!(
                "Bounce #{} (x: {}, y: {}) -> {}",
                self.bounces,
                report.bounced_x,
                report.bounced_y,
                self.square.color.to_hex()
            );
        }

        report
    }

    /// Classify a tap at host time `now_ms`. Returns `None` after `stop()`.
    pub fn on_tap(&mut self, now_ms: f64) -> Option<TapOutcome> {
        if self.stopped {
            return None;
        }

        // A single-tap timer the host never delivered is settled before the new tap
        self.poll_timers(now_ms);

        let outcome = self.gestures.tap(now_ms, self.double_tap_window_ms);
        match outcome {
            TapOutcome::DoubleTap { .. } => {
                let changed = self.state.slow_down();
                log::debug!("Double tap at {:.0}ms", now_ms);
                if changed {
                    log::info!("Speed decreased to {}", self.state.speed_factor());
                }
            }
            TapOutcome::SingleTapPending { pending } => {
                log::debug!("Single tap at {:.0}ms, toggle due at {:.0}ms", now_ms, pending.due_ms);
            }
        }
        Some(outcome)
    }

    /// Raise the speed factor by one, capped. Returns true if it changed.
    pub fn on_long_press(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        let changed = self.state.speed_up();
        if changed {
            log::info!("Speed increased to {}", self.state.speed_factor());
        } else {
            log::debug!("Long press at max speed");
        }
        changed
    }

    /// The host timer for single tap `id` fired. Toggles motion only if
    /// that timer is still pending. Returns true if motion toggled.
    pub fn single_tap_elapsed(&mut self, id: TimerId) -> bool {
        if self.stopped || !self.gestures.expire(id) {
            return false;
        }
        self.toggle_motion();
        true
    }

    /// Fire the pending single-tap timer if it is due at `now_ms`.
    /// For hosts that poll instead of scheduling timeouts.
    pub fn poll_timers(&mut self, now_ms: f64) -> bool {
        if self.stopped || self.gestures.expire_due(now_ms).is_none() {
            return false;
        }
        self.toggle_motion();
        true
    }

    /// Cancel the pending single-tap timer and ignore all further input.
    /// Safe to call more than once.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.gestures.cancel();
        self.stopped = true;
        log::info!(
            "Bouncer stopped after {} ticks, {} bounces",
            self.ticks,
            self.bounces
        );
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            x: self.square.pos.x,
            y: self.square.pos.y,
            side: self.square.side,
            color: self.square.color,
            color_hex: self.square.color.to_hex(),
            speed_factor: self.state.speed_factor(),
            moving: self.state.moving,
        }
    }

    fn toggle_motion(&mut self) {
        self.state.toggle();
        log::info!(
            "Motion {}",
            if self.state.moving { "resumed" } else { "paused" }
        );
    }

    pub fn square(&self) -> &Square {
        &self.square
    }

    pub fn is_moving(&self) -> bool {
        self.state.moving
    }

    pub fn speed_factor(&self) -> u8 {
        self.state.speed_factor()
    }

    pub fn pending_tap(&self) -> Option<PendingTap> {
        self.gestures.pending()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn bounces(&self) -> u64 {
        self.bounces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn bouncer(seed: u64) -> Bouncer {
        Bouncer::new(Viewport::new(400.0, 300.0), &Settings::default(), seed)
    }

    #[test]
    fn test_initial_state() {
        let b = bouncer(42);
        assert!(b.is_moving());
        assert_eq!(b.speed_factor(), INITIAL_SPEED_FACTOR);
        assert_eq!(
            b.square().vel,
            Vec2::new(INITIAL_VELOCITY_X, INITIAL_VELOCITY_Y)
        );
        assert_eq!(b.square().side, SQUARE_SIZE);
        let snap = b.snapshot();
        assert_eq!(snap.color_hex.len(), 7);
        assert!(snap.color_hex.starts_with('#'));
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = bouncer(99999);
        let mut b = bouncer(99999);
        for _ in 0..500 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.bounces(), b.bounces());
    }

    #[test]
    fn test_tick_paused_is_noop() {
        let mut b = bouncer(1);
        let TapOutcome::SingleTapPending { pending } = b.on_tap(0.0).unwrap() else {
            panic!("expected pending");
        };
        assert!(b.single_tap_elapsed(pending.id));
        assert!(!b.is_moving());

        let before = b.snapshot();
        let report = b.tick();
        assert!(!report.advanced);
        assert_eq!(b.snapshot(), before);
        assert_eq!(b.ticks(), 0);
    }

    #[test]
    fn test_double_tap_slows_without_toggle() {
        let mut b = bouncer(1);
        let first = b.on_tap(0.0).unwrap();
        let second = b.on_tap(150.0).unwrap();
        let TapOutcome::SingleTapPending { pending } = first else {
            panic!("expected pending");
        };
        assert_eq!(
            second,
            TapOutcome::DoubleTap {
                cancelled: Some(pending.id)
            }
        );
        assert_eq!(b.speed_factor(), 0);
        // The cancelled timer never toggles
        assert!(!b.single_tap_elapsed(pending.id));
        assert!(!b.poll_timers(10_000.0));
        assert!(b.is_moving());
    }

    #[test]
    fn test_double_tap_at_zero_speed() {
        let mut b = bouncer(1);
        b.on_tap(0.0);
        b.on_tap(50.0);
        assert_eq!(b.speed_factor(), 0);
        b.on_tap(1000.0);
        b.on_tap(1050.0);
        assert_eq!(b.speed_factor(), 0);
    }

    #[test]
    fn test_single_tap_toggles_after_window() {
        let mut b = bouncer(1);
        b.on_tap(0.0);
        assert!(!b.poll_timers(199.0));
        assert!(b.is_moving());
        assert!(b.poll_timers(200.0));
        assert!(!b.is_moving());
        assert_eq!(b.speed_factor(), INITIAL_SPEED_FACTOR);
    }

    #[test]
    fn test_undelivered_timer_settles_before_next_tap() {
        let mut b = bouncer(1);
        b.on_tap(0.0);
        // Host never fired the timer; a later isolated tap settles it first
        b.on_tap(500.0);
        assert!(!b.is_moving());
        assert!(b.poll_timers(700.0));
        assert!(b.is_moving());
    }

    #[test]
    fn test_long_press_leaves_motion_alone() {
        let mut b = bouncer(3);
        let before = b.square().clone();
        assert!(b.on_long_press());
        assert_eq!(b.speed_factor(), 2);
        assert_eq!(b.square().pos, before.pos);
        assert_eq!(b.square().vel, before.vel);
        assert!(b.is_moving());

        for _ in 0..10 {
            b.on_long_press();
        }
        assert_eq!(b.speed_factor(), MAX_SPEED_FACTOR);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut b = bouncer(5);
        b.on_tap(0.0);
        b.stop();
        b.stop();
        assert!(b.is_stopped());
        assert!(b.pending_tap().is_none());
        assert!(!b.poll_timers(1000.0));
        assert!(b.on_tap(2000.0).is_none());
        assert!(!b.on_long_press());
        let before = b.snapshot();
        assert!(!b.tick().advanced);
        assert_eq!(b.snapshot(), before);
    }

    #[test]
    fn test_degenerate_viewport() {
        let mut b = Bouncer::new(Viewport::new(0.0, 0.0), &Settings::default(), 8);
        for _ in 0..5 {
            b.tick();
        }
        let snap = b.snapshot();
        assert_eq!((snap.x, snap.y), (0.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_color_changes_only_on_bounce(seed in any::<u64>(), frames in 1usize..600) {
            let mut b = bouncer(seed);
            for _ in 0..frames {
                let before = b.square().color;
                let report = b.tick();
                prop_assert_eq!(b.square().color != before, report.bounced());
            }
        }

        #[test]
        fn prop_speed_stays_in_range(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut b = bouncer(11);
            let mut now = 0.0;
            for up in ops {
                if up {
                    b.on_long_press();
                } else {
                    // Double tap pair
                    b.on_tap(now);
                    b.on_tap(now + 50.0);
                }
                now += 1000.0;
                prop_assert!(b.speed_factor() <= MAX_SPEED_FACTOR);
            }
        }
    }
}
