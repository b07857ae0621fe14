//! Deterministic simulation module
//!
//! All square and gesture logic lives here. This module must stay pure:
//! - Seeded RNG only
//! - Host time is passed in, never read
//! - No rendering or platform dependencies

pub mod bouncer;
pub mod collision;
pub mod gesture;
pub mod state;
pub mod tick;

pub use bouncer::{Bouncer, RenderSnapshot};
pub use collision::{AxisHit, check_axis};
pub use gesture::{GestureState, PendingTap, TapOutcome, TimerId};
pub use state::{Color, SimulationState, Square, Viewport};
pub use tick::{TickReport, advance};
