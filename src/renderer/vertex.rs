//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in screen pixels with a straight-alpha RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    /// Buffer layout matching `VertexInput` in `shader.wgsl`
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Fixed palette (enemy and projectile colors live on the entities)
pub mod colors {
    use crate::hex_color;

    pub const PLAYER_BODY: [f32; 4] = hex_color(0x0891b2);
    pub const PLAYER_WINGS: [f32; 4] = hex_color(0x0ea5e9);
    pub const PLAYER_GLOW: [f32; 4] = [0.024, 0.714, 0.831, 0.5];
    pub const DETAIL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const TRACER_CORE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const LABEL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.008, 0.024, 0.09, 1.0];
}
