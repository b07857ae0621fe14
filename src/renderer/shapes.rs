//! Geometry for the square

use super::vertex::Vertex;
use crate::sim::{RenderSnapshot, Viewport};

/// Map a point in viewport pixels (origin top-left, y down) to clip space
pub fn pixel_to_ndc(viewport: &Viewport, x: f32, y: f32) -> [f32; 2] {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return [-1.0, 1.0];
    }
    [
        x / viewport.width * 2.0 - 1.0,
        1.0 - y / viewport.height * 2.0,
    ]
}

/// Two triangles covering an axis-aligned square with top-left at (x, y)
pub fn square(viewport: &Viewport, x: f32, y: f32, side: f32, color: [f32; 4]) -> [Vertex; 6] {
    let [l, t] = pixel_to_ndc(viewport, x, y);
    let [r, b] = pixel_to_ndc(viewport, x + side, y + side);

    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
        Vertex::new(l, t, color),
        Vertex::new(r, b, color),
        Vertex::new(r, t, color),
    ]
}

/// Decode one sRGB channel to linear light
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Vertices for one frame. An sRGB target re-encodes whatever the shader
/// writes, so the hex color is linearized first.
pub fn snapshot_vertices(
    viewport: &Viewport,
    snap: &RenderSnapshot,
    srgb_target: bool,
) -> [Vertex; 6] {
    let mut color = snap.color.to_rgba();
    if srgb_target {
        for c in &mut color[..3] {
            *c = srgb_to_linear(*c);
        }
    }
    square(viewport, snap.x, snap.y, snap.side, color)
}
