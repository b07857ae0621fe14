//! WebGPU rendering module
//!
//! Draws the square as a single colored quad over a white background.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
