//! Per-frame motion step
//!
//! One call advances the square by one frame at the current speed factor.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::check_axis;
use super::state::{Color, Square, Viewport};

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Whether the frame advanced the square at all
    pub advanced: bool,
    pub bounced_x: bool,
    pub bounced_y: bool,
    pub recolored: bool,
}

impl TickReport {
    pub fn bounced(&self) -> bool {
        self.bounced_x || self.bounced_y
    }
}

/// Advance the square by one frame.
///
/// The candidate position `pos + vel * speed` is checked per axis. An axis
/// that touches or crosses an edge has its velocity negated and its position
/// snapped to that edge. Any hit recolors the square. The square then moves
/// one full step with the post-bounce velocity, so bounce frames carry an
/// extra step away from the wall.
pub fn advance(
    square: &mut Square,
    viewport: &Viewport,
    speed_factor: u8,
    rng: &mut impl Rng,
) -> TickReport {
    let speed = speed_factor as f32;
    let next = square.pos + square.vel * speed;
    let mut report = TickReport {
        advanced: true,
        ..Default::default()
    };

    let hit_x = check_axis(next.x, square.side, viewport.width);
    if let Some(x) = hit_x.clamp_target(square.side, viewport.width) {
        square.vel.x = -square.vel.x;
        square.pos.x = x;
        report.bounced_x = true;
    }

    let hit_y = check_axis(next.y, square.side, viewport.height);
    if let Some(y) = hit_y.clamp_target(square.side, viewport.height) {
        square.vel.y = -square.vel.y;
        square.pos.y = y;
        report.bounced_y = true;
    }

    if report.bounced() {
        square.color = Color::random_except(rng, square.color);
        report.recolored = true;
    }

    square.pos += square.vel * speed;
    // Only bites when the viewport is smaller than one bounce step
    square.pos = viewport.contain(square.pos, square.side);

    report
}
