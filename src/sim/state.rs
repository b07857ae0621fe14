//! Simulation state types
//!
//! Everything the square needs between frames lives here. Nothing in this
//! module knows about the host, timers or rendering.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Drawable area, fixed at startup from the host display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when a square of `side` cannot fit (non-positive or too small dimensions)
    pub fn is_degenerate(&self, side: f32) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= side
            || self.height <= side
    }

    /// Largest top-left corner that keeps a square of `side` inside.
    /// Collapses to the origin on a degenerate viewport.
    pub fn max_corner(&self, side: f32) -> Vec2 {
        let max_x = if self.width.is_finite() { (self.width - side).max(0.0) } else { 0.0 };
        let max_y = if self.height.is_finite() { (self.height - side).max(0.0) } else { 0.0 };
        Vec2::new(max_x, max_y)
    }

    /// Clamp a top-left corner into the viewport
    pub fn contain(&self, pos: Vec2, side: f32) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.max_corner(side))
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(u32);

impl Color {
    pub const MAX: u32 = 0xFF_FFFF;

    pub const fn new(rgb: u32) -> Self {
        Self(rgb & Self::MAX)
    }

    pub const fn rgb(&self) -> u32 {
        self.0
    }

    /// Uniform over the full 24-bit space
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(rng.random_range(0..=Self::MAX))
    }

    /// Uniform over every color except `current`
    pub fn random_except(rng: &mut impl Rng, current: Color) -> Self {
        loop {
            let color = Self::random(rng);
            if color != current {
                return color;
            }
        }
    }

    /// `#rrggbb`, always six digits
    pub fn to_hex(&self) -> String {
        format!("#{:06x}", self.0)
    }

    /// Normalized RGBA for the GPU
    pub fn to_rgba(&self) -> [f32; 4] {
        let r = ((self.0 >> 16) & 0xFF) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xFF) as f32 / 255.0;
        let b = (self.0 & 0xFF) as f32 / 255.0;
        [r, g, b, 1.0]
    }
}

/// The bouncing square
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Square {
    /// Side length (pixels)
    pub side: f32,
    /// Top-left corner (pixels)
    pub pos: Vec2,
    /// Base velocity (pixels per tick, before the speed factor)
    pub vel: Vec2,
    pub color: Color,
}

impl Square {
    /// Random position inside the viewport, random color, given base velocity
    pub fn spawn(viewport: &Viewport, side: f32, vel: Vec2, rng: &mut impl Rng) -> Self {
        let max = viewport.max_corner(side);
        let x = if max.x > 0.0 { rng.random_range(0.0..max.x) } else { 0.0 };
        let y = if max.y > 0.0 { rng.random_range(0.0..max.y) } else { 0.0 };
        Self {
            side,
            pos: Vec2::new(x, y),
            vel,
            color: Color::random(rng),
        }
    }
}

/// Motion toggle and speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    pub moving: bool,
    speed_factor: u8,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            moving: true,
            speed_factor: INITIAL_SPEED_FACTOR,
        }
    }
}

impl SimulationState {
    pub fn new(moving: bool, speed_factor: u8) -> Self {
        Self {
            moving,
            speed_factor: speed_factor.clamp(MIN_SPEED_FACTOR, MAX_SPEED_FACTOR),
        }
    }

    pub fn speed_factor(&self) -> u8 {
        self.speed_factor
    }

    /// Returns true if the speed changed (false at the ceiling)
    pub fn speed_up(&mut self) -> bool {
        if self.speed_factor < MAX_SPEED_FACTOR {
            self.speed_factor += 1;
            true
        } else {
            false
        }
    }

    /// Returns true if the speed changed (false at the floor)
    pub fn slow_down(&mut self) -> bool {
        if self.speed_factor > MIN_SPEED_FACTOR {
            self.speed_factor -= 1;
            true
        } else {
            false
        }
    }

    pub fn toggle(&mut self) {
        self.moving = !self.moving;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_hex_is_zero_padded() {
        assert_eq!(Color::new(0xfff).to_hex(), "#000fff");
        assert_eq!(Color::new(0xABCDEF).to_hex(), "#abcdef");
        assert_eq!(Color::new(0x1_000000).rgb(), 0);
    }

    #[test]
    fn test_rgba() {
        assert_eq!(Color::new(0xFF0000).to_rgba(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(Color::new(0x0000FF).to_rgba(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_random_except_differs() {
        let mut rng = Pcg32::seed_from_u64(7);
        let current = Color::new(0x123456);
        for _ in 0..100 {
            assert_ne!(Color::random_except(&mut rng, current), current);
        }
    }

    #[test]
    fn test_spawn_inside_viewport() {
        let mut rng = Pcg32::seed_from_u64(1);
        let viewport = Viewport::new(400.0, 300.0);
        for _ in 0..50 {
            let sq = Square::spawn(&viewport, SQUARE_SIZE, Vec2::new(2.0, 3.0), &mut rng);
            assert!(sq.pos.x >= 0.0 && sq.pos.x <= 350.0);
            assert!(sq.pos.y >= 0.0 && sq.pos.y <= 250.0);
        }
    }

    #[test]
    fn test_degenerate_viewport_pins_origin() {
        let mut rng = Pcg32::seed_from_u64(1);
        let viewport = Viewport::new(-10.0, 0.0);
        assert!(viewport.is_degenerate(SQUARE_SIZE));
        assert_eq!(viewport.max_corner(SQUARE_SIZE), Vec2::ZERO);
        let sq = Square::spawn(&viewport, SQUARE_SIZE, Vec2::new(2.0, 3.0), &mut rng);
        assert_eq!(sq.pos, Vec2::ZERO);
    }

    #[test]
    fn test_speed_clamps() {
        let mut state = SimulationState::new(true, 5);
        assert!(!state.speed_up());
        assert_eq!(state.speed_factor(), 5);

        let mut state = SimulationState::new(true, 0);
        assert!(!state.slow_down());
        assert_eq!(state.speed_factor(), 0);

        assert_eq!(SimulationState::new(false, 9).speed_factor(), 5);
    }
}
