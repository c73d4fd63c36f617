//! Shape generation for 2D primitives
//!
//! Every shape is emitted as a flat triangle list in screen pixels.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Same color with a different alpha
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

/// Rotate `point` around `pivot` by `angle` radians
pub fn rotate_about(point: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
    pivot + Vec2::from_angle(angle).rotate(point - pivot)
}

/// Append a filled triangle
pub fn triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Append a filled convex quad (corners in winding order)
pub fn quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: [f32; 4]) {
    let [a, b, c, d] = corners;
    triangle(out, a, b, c, color);
    triangle(out, a, c, d, color);
}

/// Corners of an axis-aligned rectangle, clockwise from top-left
pub fn rect_corners(x: f32, y: f32, w: f32, h: f32) -> [Vec2; 4] {
    [
        Vec2::new(x, y),
        Vec2::new(x + w, y),
        Vec2::new(x + w, y + h),
        Vec2::new(x, y + h),
    ]
}

/// Append a filled axis-aligned rectangle
pub fn rect(out: &mut Vec<Vertex>, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
    quad(out, rect_corners(x, y, w, h), color);
}

/// Append a rectangle outline of the given stroke width
pub fn rect_outline(out: &mut Vec<Vertex>, corners: [Vec2; 4], width: f32, color: [f32; 4]) {
    for i in 0..4 {
        line(out, corners[i], corners[(i + 1) % 4], width, color);
    }
}

/// Append a thick line segment
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    quad(out, [from + perp, to + perp, to - perp, from - perp], color);
}

/// Append a filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        triangle(
            out,
            center,
            center + Vec2::new(radius * theta1.cos(), radius * theta1.sin()),
            center + Vec2::new(radius * theta2.cos(), radius * theta2.sin()),
            color,
        );
    }
}

/// Soft glow: concentric translucent circles fading outward
pub fn glow(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    const LAYERS: u32 = 3;
    for layer in 0..LAYERS {
        let t = (layer + 1) as f32 / LAYERS as f32;
        let alpha = 0.12 * (1.0 - t) + 0.04;
        circle(out, center, radius * t, with_alpha(color, alpha), segments);
    }
}

/// Offset every vertex
pub fn translate(vertices: &mut [Vertex], offset: Vec2) {
    for v in vertices {
        v.position[0] += offset.x;
        v.position[1] += offset.y;
    }
}
