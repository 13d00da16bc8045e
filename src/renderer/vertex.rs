//! GPU data layouts for block rendering

use bytemuck::{Pod, Zeroable};

use crate::settings::Rgba;

/// One block, drawn as an instanced quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BlockInstance {
    /// Top-left corner, canvas space
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub color: Rgba,
}

impl BlockInstance {
    pub const fn new(x: f32, y: f32, w: f32, h: f32, color: Rgba) -> Self {
        Self {
            position: [x, y],
            size: [w, h],
            color,
        }
    }

    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BlockInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Group transform shared by every block (must match shader.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Globals {
    /// Canvas size in CSS pixels
    pub resolution: [f32; 2],
    /// Canvas-space point the scale is applied around
    pub pivot: [f32; 2],
    /// Where the pivot lands on screen (current canvas center)
    pub center: [f32; 2],
    pub scale: f32,
    pub _pad: f32,
}
