//! Rendering
//!
//! The engine talks to a [`RenderSink`]: filled rectangles for blocks, text
//! labels with adjustable opacity, and one uniform scale for the whole group.
//! The browser backend draws blocks with WebGPU (instanced quads) and labels
//! as DOM elements layered over the canvas.

pub mod dispatch;
pub mod headless;
pub mod pipeline;
pub mod vertex;
#[cfg(target_arch = "wasm32")]
pub mod overlay;

pub use dispatch::DrawDispatch;
pub use headless::HeadlessSink;
pub use pipeline::BlockRenderState;

use glam::Vec2;
use thiserror::Error;

use crate::CanvasSize;
use crate::settings::Rgba;

/// Opaque reference to a label created by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelHandle(pub usize);

/// How labels are drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub color: Rgba,
    /// Font size in canvas pixels at scale 1.0
    pub font_px: f32,
}

/// Renderer failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("no GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not compatible with the adapter")]
    UnsupportedSurface,
    #[error("DOM error: {0}")]
    Dom(String),
}

/// Drawing target for the spiral
pub trait RenderSink {
    /// Queue a filled rectangle (canvas space, top-left corner)
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);

    /// Create a text label centered on `center`
    fn draw_text(
        &mut self,
        text: &str,
        center: Vec2,
        style: &LabelStyle,
    ) -> Result<LabelHandle, RenderError>;

    /// Set a label's opacity (0.0 - 1.0)
    fn set_opacity(&mut self, label: LabelHandle, opacity: f32);

    /// Canvas-space point the group scale is applied around
    fn set_group_pivot(&mut self, pivot: Vec2);

    /// Uniform scale of everything drawn so far and later
    fn set_group_scale(&mut self, scale: f32);

    /// The canvas changed size
    fn resize(&mut self, size: CanvasSize);

    /// Flush the frame to the screen
    fn present(&mut self) -> Result<(), RenderError>;
}
