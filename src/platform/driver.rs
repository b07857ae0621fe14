//! Host-facing driver
//!
//! Connects a [`Bouncer`] to whatever schedules frames and timeouts on the
//! host (the browser, or a virtual clock in tests and the headless runner).
//! The driver owns every outstanding handle so teardown can cancel them all.

use super::input::{Gesture, PressTracker};
use crate::sim::{Bouncer, RenderSnapshot, TapOutcome, TickReport, TimerId};

/// Which one-shot timer a host timeout belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    SingleTap,
    LongPress,
}

/// Host scheduling primitives. `None` means the host refused to schedule.
pub trait FrameHost {
    /// Ask for one `Driver::on_frame` call at the next display refresh
    fn request_frame(&mut self) -> Option<i32>;
    fn cancel_frame(&mut self, handle: i32);
    /// Ask for one `Driver::on_timeout(kind, ..)` call after `delay_ms`
    fn set_timeout(&mut self, kind: TimerKind, delay_ms: f64) -> Option<i32>;
    fn clear_timeout(&mut self, handle: i32);
}

pub struct Driver<H: FrameHost> {
    bouncer: Bouncer,
    host: H,
    presses: PressTracker,
    frame: Option<i32>,
    single_tap: Option<(TimerId, i32)>,
    long_press: Option<i32>,
    stopped: bool,
}

impl<H: FrameHost> Driver<H> {
    pub fn new(bouncer: Bouncer, host: H, long_press_ms: f64) -> Self {
        Self {
            bouncer,
            host,
            presses: PressTracker::new(long_press_ms),
            frame: None,
            single_tap: None,
            long_press: None,
            stopped: false,
        }
    }

    /// Arm the first frame if the square starts moving
    pub fn start(&mut self) {
        if !self.stopped {
            self.sync_frame_loop();
        }
    }

    /// The requested frame arrived. Ticks once and re-arms while moving.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<TickReport> {
        self.frame = None;
        if self.stopped {
            return None;
        }

        // Backstop for a single-tap timeout the host was late with or refused
        if self.bouncer.poll_timers(now_ms) {
            self.forget_single_tap_timeout();
        }

        let report = self.bouncer.tick();
        self.sync_frame_loop();
        Some(report)
    }

    pub fn pointer_down(&mut self, now_ms: f64) {
        if self.stopped {
            return;
        }
        self.presses.press(now_ms);
        self.clear_long_press_timeout();
        self.long_press = self
            .host
            .set_timeout(TimerKind::LongPress, self.presses.long_press_ms());
        if self.long_press.is_none() {
            log::warn!("Host refused long-press timeout; long-press resolves on release");
        }
    }

    /// Returns the gesture the release completed, if any
    pub fn pointer_up(&mut self, now_ms: f64) -> Option<Gesture> {
        if self.stopped {
            return None;
        }
        self.clear_long_press_timeout();
        let gesture = self.presses.release(now_ms)?;
        self.dispatch(gesture, now_ms);
        Some(gesture)
    }

    pub fn pointer_cancel(&mut self) {
        self.presses.cancel();
        self.clear_long_press_timeout();
    }

    /// A timeout set through `FrameHost::set_timeout` fired
    pub fn on_timeout(&mut self, kind: TimerKind, now_ms: f64) {
        if self.stopped {
            return;
        }
        match kind {
            TimerKind::SingleTap => {
                let Some((id, _)) = self.single_tap.take() else {
                    return;
                };
                if self.bouncer.single_tap_elapsed(id) {
                    self.sync_frame_loop();
                }
            }
            TimerKind::LongPress => {
                self.long_press = None;
                if let Some(gesture) = self.presses.fire_long_press() {
                    self.dispatch(gesture, now_ms);
                }
            }
        }
    }

    /// Park the frame loop and drop any press while the page sits in the
    /// back/forward cache. `start()` picks up where it left off.
    pub fn suspend(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }
        self.pointer_cancel();
    }

    /// Cancel the frame loop and all timers. Safe to call repeatedly; also
    /// runs on drop.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }
        self.forget_single_tap_timeout();
        self.clear_long_press_timeout();
        self.presses.cancel();
        self.bouncer.stop();
    }

    fn dispatch(&mut self, gesture: Gesture, now_ms: f64) {
        match gesture {
            Gesture::Tap => self.handle_tap(now_ms),
            Gesture::LongPress => {
                self.bouncer.on_long_press();
            }
        }
    }

    fn handle_tap(&mut self, now_ms: f64) {
        match self.bouncer.on_tap(now_ms) {
            Some(TapOutcome::SingleTapPending { pending }) => {
                // A previous timer, if any, was settled inside on_tap
                self.forget_single_tap_timeout();
                let delay = (pending.due_ms - now_ms).max(0.0);
                match self.host.set_timeout(TimerKind::SingleTap, delay) {
                    Some(handle) => self.single_tap = Some((pending.id, handle)),
                    None => log::warn!("Host refused single-tap timeout; next frame will settle it"),
                }
            }
            Some(TapOutcome::DoubleTap { cancelled }) => {
                if let Some((id, handle)) = self.single_tap.take() {
                    if cancelled != Some(id) {
                        log::debug!("Dropping stale single-tap timeout {:?}", id);
                    }
                    self.host.clear_timeout(handle);
                }
            }
            None => {}
        }
        self.sync_frame_loop();
    }

    /// Keep exactly one frame armed while moving and none while paused
    fn sync_frame_loop(&mut self) {
        if self.stopped {
            return;
        }
        match (self.bouncer.is_moving(), self.frame) {
            (true, None) => {
                self.frame = self.host.request_frame();
                if self.frame.is_none() {
                    log::warn!("Host refused animation frame");
                }
            }
            (false, Some(handle)) => {
                self.host.cancel_frame(handle);
                self.frame = None;
            }
            _ => {}
        }
    }

    fn forget_single_tap_timeout(&mut self) {
        if let Some((_, handle)) = self.single_tap.take() {
            self.host.clear_timeout(handle);
        }
    }

    fn clear_long_press_timeout(&mut self) {
        if let Some(handle) = self.long_press.take() {
            self.host.clear_timeout(handle);
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.bouncer.snapshot()
    }

    pub fn bouncer(&self) -> &Bouncer {
        &self.bouncer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn frame_armed(&self) -> bool {
        self.frame.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl<H: FrameHost> Drop for Driver<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
