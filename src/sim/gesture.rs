//! Tap disambiguation
//!
//! A tap either completes a double-tap (previous tap inside the window) or
//! opens a single-tap timer. The timer is only a record here: the owner
//! decides when it elapses and must check it is still pending before acting.

use serde::{Deserialize, Serialize};

/// Identifies one single-tap timer so a stale expiry can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A single-tap waiting to see whether a second tap follows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingTap {
    pub id: TimerId,
    /// Host time (ms) at which the tap counts as single
    pub due_ms: f64,
}

/// Classification of one tap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TapOutcome {
    /// First tap of a possible pair; toggles motion when `pending` elapses
    SingleTapPending { pending: PendingTap },
    /// Second tap inside the window; `cancelled` is the single-tap timer it consumed
    DoubleTap { cancelled: Option<TimerId> },
}

/// Last tap time and the outstanding single-tap timer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureState {
    last_tap_ms: Option<f64>,
    pending: Option<PendingTap>,
    next_timer: u64,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_tap_ms(&self) -> Option<f64> {
        self.last_tap_ms
    }

    pub fn pending(&self) -> Option<PendingTap> {
        self.pending
    }

    /// Classify a tap at `now_ms`. The tap time is always recorded.
    pub fn tap(&mut self, now_ms: f64, window_ms: f64) -> TapOutcome {
        let is_double = self
            .last_tap_ms
            .is_some_and(|last| now_ms - last < window_ms);
        self.last_tap_ms = Some(now_ms);

        if is_double {
            let cancelled = self.pending.take().map(|p| p.id);
            TapOutcome::DoubleTap { cancelled }
        } else {
            let pending = PendingTap {
                id: self.allocate_timer(),
                due_ms: now_ms + window_ms,
            };
            self.pending = Some(pending);
            TapOutcome::SingleTapPending { pending }
        }
    }

    /// Consume the pending timer if it is `id`. Returns false for a
    /// cancelled or already-consumed timer.
    pub fn expire(&mut self, id: TimerId) -> bool {
        match self.pending {
            Some(p) if p.id == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Consume the pending timer if it is due at `now_ms`
    pub fn expire_due(&mut self, now_ms: f64) -> Option<TimerId> {
        match self.pending {
            Some(p) if p.due_ms <= now_ms => {
                self.pending = None;
                Some(p.id)
            }
            _ => None,
        }
    }

    /// Drop the pending timer without firing it
    pub fn cancel(&mut self) -> Option<TimerId> {
        self.pending.take().map(|p| p.id)
    }

    fn allocate_timer(&mut self) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: f64 = 200.0;

    #[test]
    fn test_first_tap_is_pending() {
        let mut g = GestureState::new();
        let outcome = g.tap(1000.0, WINDOW);
        match outcome {
            TapOutcome::SingleTapPending { pending } => assert_eq!(pending.due_ms, 1200.0),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(g.last_tap_ms(), Some(1000.0));
    }

    #[test]
    fn test_second_tap_inside_window_cancels() {
        let mut g = GestureState::new();
        let TapOutcome::SingleTapPending { pending } = g.tap(0.0, WINDOW) else {
            panic!("expected pending");
        };
        let outcome = g.tap(150.0, WINDOW);
        assert_eq!(
            outcome,
            TapOutcome::DoubleTap {
                cancelled: Some(pending.id)
            }
        );
        assert!(g.pending().is_none());
        // A late expiry of the cancelled timer is ignored
        assert!(!g.expire(pending.id));
    }

    #[test]
    fn test_window_is_exclusive() {
        let mut g = GestureState::new();
        g.tap(0.0, WINDOW);
        assert!(matches!(
            g.tap(200.0, WINDOW),
            TapOutcome::SingleTapPending { .. }
        ));
    }

    #[test]
    fn test_third_quick_tap_is_another_double() {
        let mut g = GestureState::new();
        g.tap(0.0, WINDOW);
        g.tap(100.0, WINDOW);
        assert_eq!(
            g.tap(180.0, WINDOW),
            TapOutcome::DoubleTap { cancelled: None }
        );
    }

    #[test]
    fn test_expire_due() {
        let mut g = GestureState::new();
        g.tap(0.0, WINDOW);
        assert_eq!(g.expire_due(199.0), None);
        assert!(g.expire_due(200.0).is_some());
        assert_eq!(g.expire_due(500.0), None);
    }

    #[test]
    fn test_timer_ids_are_unique() {
        let mut g = GestureState::new();
        let TapOutcome::SingleTapPending { pending: a } = g.tap(0.0, WINDOW) else {
            panic!("expected pending");
        };
        g.expire(a.id);
        let TapOutcome::SingleTapPending { pending: b } = g.tap(1000.0, WINDOW) else {
            panic!("expected pending");
        };
        assert_ne!(a.id, b.id);
        assert!(!g.expire(a.id));
        assert!(g.expire(b.id));
    }
}
