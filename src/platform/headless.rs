//! Virtual-clock host
//!
//! Runs the driver without a display: frames arrive every `FRAME_MS`,
//! timeouts at their due time, and nothing happens between calls to
//! `Simulation::advance_to`.

use super::driver::{Driver, FrameHost, TimerKind};
use super::input::Gesture;
use crate::Settings;
use crate::consts::FRAME_MS;
use crate::sim::{Bouncer, RenderSnapshot, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scheduled {
    Frame,
    Timeout(TimerKind),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    handle: i32,
    due_ms: f64,
    what: Scheduled,
}

/// `FrameHost` on a manually advanced clock
#[derive(Debug)]
pub struct ManualHost {
    now_ms: f64,
    frame_ms: f64,
    next_handle: i32,
    queue: Vec<Entry>,
    frames_requested: u64,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new(FRAME_MS)
    }
}

impl ManualHost {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_ms,
            next_handle: 1,
            queue: Vec::new(),
            frames_requested: 0,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Frames plus timeouts still waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    fn schedule(&mut self, due_ms: f64, what: Scheduled) -> i32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.queue.push(Entry {
            handle,
            due_ms,
            what,
        });
        handle
    }

    fn remove(&mut self, handle: i32) {
        self.queue.retain(|e| e.handle != handle);
    }

    /// Pop the earliest entry due by `limit_ms`. Ties go to the oldest handle.
    fn pop_due(&mut self, limit_ms: f64) -> Option<Entry> {
        let index = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= limit_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.cmp(&b.handle))
            })
            .map(|(i, _)| i)?;
        let entry = self.queue.remove(index);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some(entry)
    }
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> Option<i32> {
        self.frames_requested += 1;
        let due = self.now_ms + self.frame_ms;
        Some(self.schedule(due, Scheduled::Frame))
    }

    fn cancel_frame(&mut self, handle: i32) {
        self.remove(handle);
    }

    fn set_timeout(&mut self, kind: TimerKind, delay_ms: f64) -> Option<i32> {
        let due = self.now_ms + delay_ms.max(0.0);
        Some(self.schedule(due, Scheduled::Timeout(kind)))
    }

    fn clear_timeout(&mut self, handle: i32) {
        self.remove(handle);
    }
}

/// One scripted gesture, by start time in ms
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scripted {
    Tap(f64),
    LongPress(f64),
}

impl Scripted {
    pub fn at(&self) -> f64 {
        match self {
            Scripted::Tap(t) | Scripted::LongPress(t) => *t,
        }
    }

    /// When the pointer comes back up
    fn released_at(&self, long_press_ms: f64) -> f64 {
        match self {
            Scripted::Tap(t) => *t,
            Scripted::LongPress(t) => t + long_press_ms,
        }
    }
}

/// Order a script by start time. There is one pointer, so an entry that
/// starts while an earlier long-press is still held is dropped.
pub fn plan_script(mut script: Vec<Scripted>, long_press_ms: f64) -> Vec<Scripted> {
    script.sort_by(|a, b| a.at().total_cmp(&b.at()));
    let mut held_until = f64::NEG_INFINITY;
    script.retain(|step| {
        if step.at() < held_until {
            log::warn!(
                "Dropping {:?}: the pointer is held until {}ms",
                step,
                held_until
            );
            return false;
        }
        held_until = step.released_at(long_press_ms);
        true
    });
    script
}

/// A bouncer on a virtual clock, stepped by scripted input
pub struct Simulation {
    driver: Driver<ManualHost>,
    frames: u64,
    bounces_seen: u64,
}

impl Simulation {
    pub fn new(viewport: Viewport, settings: &Settings, seed: u64) -> Self {
        let bouncer = Bouncer::new(viewport, settings, seed);
        let mut driver = Driver::new(bouncer, ManualHost::default(), settings.long_press_ms);
        driver.start();
        Self {
            driver,
            frames: 0,
            bounces_seen: 0,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.driver.host().now_ms()
    }

    /// Deliver every frame and timeout due up to `target_ms`, in time order
    pub fn advance_to(&mut self, target_ms: f64) {
        while let Some(entry) = self.driver.host_mut().pop_due(target_ms) {
            match entry.what {
                Scheduled::Frame => {
                    if let Some(report) = self.driver.on_frame(entry.due_ms) {
                        self.frames += 1;
                        if report.bounced() {
                            self.bounces_seen += 1;
                            log::debug!(
                                "t={:.0}ms bounce -> {}",
                                entry.due_ms,
                                self.driver.bouncer().square().color.to_hex()
                            );
                        }
                    }
                }
                Scheduled::Timeout(kind) => self.driver.on_timeout(kind, entry.due_ms),
            }
        }
        let host = self.driver.host_mut();
        host.now_ms = host.now_ms.max(target_ms);
    }

    pub fn advance_by(&mut self, ms: f64) {
        let target = self.now_ms() + ms;
        self.advance_to(target);
    }

    pub fn press(&mut self) {
        let now = self.now_ms();
        self.driver.pointer_down(now);
    }

    pub fn release(&mut self) -> Option<Gesture> {
        let now = self.now_ms();
        self.driver.pointer_up(now)
    }

    /// Press and release at `at_ms`
    pub fn tap_at(&mut self, at_ms: f64) -> Option<Gesture> {
        self.advance_to(at_ms);
        self.press();
        self.release()
    }

    /// Hold from `at_ms` until the long-press fires, then release
    pub fn long_press_at(&mut self, at_ms: f64, long_press_ms: f64) {
        self.advance_to(at_ms);
        self.press();
        self.advance_by(long_press_ms);
        self.release();
    }

    /// Play a script from [`plan_script`]
    pub fn play(&mut self, script: &[Scripted], long_press_ms: f64) {
        for step in script {
            match *step {
                Scripted::Tap(t) => {
                    self.tap_at(t);
                }
                Scripted::LongPress(t) => self.long_press_at(t, long_press_ms),
            }
        }
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.driver.snapshot()
    }

    pub fn driver(&self) -> &Driver<ManualHost> {
        &self.driver
    }

    pub fn bouncer(&self) -> &Bouncer {
        self.driver.bouncer()
    }

    /// Frames delivered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn bounces(&self) -> u64 {
        self.bounces_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    fn sim() -> Simulation {
        Simulation::new(Viewport::new(400.0, 300.0), &Settings::default(), 12345)
    }

    #[test]
    fn test_frames_run_at_sixty_hz() {
        let mut s = sim();
        // Sixty frames land in the first second; the 61st is due at ~1016ms
        s.advance_to(1001.0);
        assert_eq!(s.frames(), 60);
        assert_eq!(s.bouncer().ticks(), 60);
    }

    #[test]
    fn test_tap_then_tap_is_one_slowdown() {
        let mut s = sim();
        assert_eq!(s.tap_at(0.0), Some(Gesture::Tap));
        assert_eq!(s.tap_at(150.0), Some(Gesture::Tap));
        s.advance_to(2000.0);

        assert_eq!(s.bouncer().speed_factor(), INITIAL_SPEED_FACTOR - 1);
        assert!(s.bouncer().is_moving());
    }

    #[test]
    fn test_isolated_tap_toggles_after_window() {
        let mut s = sim();
        s.tap_at(0.0);
        s.advance_to(199.0);
        assert!(s.bouncer().is_moving());

        s.advance_to(200.0);
        assert!(!s.bouncer().is_moving());
        assert_eq!(s.bouncer().speed_factor(), INITIAL_SPEED_FACTOR);

        // Paused: no frames are scheduled and the square stays put
        let frames = s.frames();
        let requested = s.driver().host().frames_requested();
        let before = s.snapshot();
        s.advance_to(5000.0);
        assert_eq!(s.frames(), frames);
        assert_eq!(s.driver().host().frames_requested(), requested);
        assert_eq!(s.snapshot(), before);
        assert!(!s.driver().frame_armed());
    }

    #[test]
    fn test_tap_resumes_motion() {
        let mut s = sim();
        s.tap_at(0.0);
        s.advance_to(1000.0);
        assert!(!s.bouncer().is_moving());

        s.tap_at(1000.0);
        s.advance_to(1300.0);
        assert!(s.bouncer().is_moving());
        assert!(s.driver().frame_armed());
        let frames = s.frames();
        s.advance_to(2300.0);
        assert!(s.frames() >= frames + 59);
    }

    #[test]
    fn test_long_press_leaves_motion_untouched() {
        let settings = Settings {
            start_moving: false,
            ..Settings::default()
        };
        let mut s = Simulation::new(Viewport::new(400.0, 300.0), &settings, 3);
        let before = s.bouncer().square().clone();

        s.long_press_at(0.0, settings.long_press_ms);
        assert_eq!(s.bouncer().speed_factor(), 2);
        assert_eq!(s.bouncer().square().pos, before.pos);
        assert_eq!(s.bouncer().square().vel, before.vel);
        assert!(!s.bouncer().is_moving());

        for i in 1..10 {
            s.long_press_at(i as f64 * 1000.0, settings.long_press_ms);
        }
        assert_eq!(s.bouncer().speed_factor(), MAX_SPEED_FACTOR);
    }

    #[test]
    fn test_stop_twice_leaves_nothing_scheduled() {
        let mut s = sim();
        s.tap_at(0.0);
        s.press();
        s.stop();
        s.stop();
        assert_eq!(s.driver().host().pending(), 0);

        let ticks = s.bouncer().ticks();
        s.advance_to(10_000.0);
        assert_eq!(s.bouncer().ticks(), ticks);
        assert!(s.bouncer().is_moving());
        assert_eq!(s.bouncer().speed_factor(), INITIAL_SPEED_FACTOR);
    }

    #[test]
    fn test_square_stays_inside_over_long_run() {
        let settings = Settings {
            initial_speed: MAX_SPEED_FACTOR,
            ..Settings::default()
        };
        let mut s = Simulation::new(Viewport::new(320.0, 240.0), &settings, 77);
        for step in 1..=600 {
            s.advance_to(step as f64 * FRAME_MS);
            let snap = s.snapshot();
            assert!(snap.x >= 0.0 && snap.x <= 320.0 - SQUARE_SIZE);
            assert!(snap.y >= 0.0 && snap.y <= 240.0 - SQUARE_SIZE);
        }
        assert!(s.bounces() > 0);
    }

    #[test]
    fn test_plan_drops_taps_inside_a_long_press() {
        let script = vec![
            Scripted::Tap(600.0),
            Scripted::Tap(100.0),
            Scripted::LongPress(0.0),
            Scripted::Tap(500.0),
        ];
        assert_eq!(
            plan_script(script, LONG_PRESS_MS),
            vec![
                Scripted::LongPress(0.0),
                Scripted::Tap(500.0),
                Scripted::Tap(600.0),
            ]
        );
    }

    #[test]
    fn test_play_keeps_tap_times() {
        let mut s = sim();
        let script = plan_script(
            vec![Scripted::LongPress(0.0), Scripted::Tap(100.0), Scripted::Tap(1000.0)],
            LONG_PRESS_MS,
        );
        s.play(&script, LONG_PRESS_MS);
        assert_eq!(s.bouncer().speed_factor(), INITIAL_SPEED_FACTOR + 1);

        // The surviving tap pauses 200ms after it lands, not earlier
        s.advance_to(1199.0);
        assert!(s.bouncer().is_moving());
        s.advance_to(1200.0);
        assert!(!s.bouncer().is_moving());
    }

    #[test]
    fn test_advance_by_is_relative() {
        let mut s = sim();
        s.advance_to(100.0);
        s.advance_by(250.0);
        assert_eq!(s.now_ms(), 350.0);
    }
}
