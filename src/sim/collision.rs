//! Wall collision detection for the square
//!
//! Axes are checked independently: a corner hit bounces both axes, an edge
//! hit only the axis that crossed.

/// Result of checking one axis against the viewport edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisHit {
    /// Candidate position stays strictly inside
    Clear,
    /// Candidate touches or crosses the low edge (0)
    Low,
    /// Candidate touches or crosses the high edge (`extent - side`)
    High,
}

impl AxisHit {
    pub fn hit(&self) -> bool {
        !matches!(self, AxisHit::Clear)
    }

    /// Position the square is snapped to on this axis after a hit
    pub fn clamp_target(&self, side: f32, extent: f32) -> Option<f32> {
        match self {
            AxisHit::Clear => None,
            AxisHit::Low => Some(0.0),
            AxisHit::High => Some((extent - side).max(0.0)),
        }
    }
}

/// Check a candidate coordinate on one axis.
///
/// A touch counts as a hit (`next <= 0` or `next + side >= extent`). The low
/// edge wins when both are crossed, which only happens on a viewport smaller
/// than the square.
pub fn check_axis(next: f32, side: f32, extent: f32) -> AxisHit {
    if next <= 0.0 {
        AxisHit::Low
    } else if next + side >= extent {
        AxisHit::High
    } else {
        AxisHit::Clear
    }
}
