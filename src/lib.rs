//! Prime Spiral - an animated Ulam spiral that zooms out as it grows
//!
//! Core modules:
//! - `sim`: Deterministic reveal pacing, spiral layout, zoom and label fade
//! - `renderer`: Render sink abstraction, draw dispatch and the WebGPU backend
//! - `platform`: Frame loop and scheduler abstraction (browser/native)
//! - `settings`: Themes and tunables

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use platform::{CancelToken, FrameLoop, FrameScheduler, FrameStatus};
pub use renderer::{RenderError, RenderSink};
pub use settings::{Settings, Theme, ThemePreset};

use serde::{Deserialize, Serialize};

/// Visualization configuration constants
pub mod consts {
    /// Canvas size used before the host reports a real one
    pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
    pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

    /// Edge length of one block in canvas pixels
    pub const BLOCK_SIZE: f32 = 24.0;

    /// Numbers below this get a text label
    pub const LABEL_THRESHOLD: u64 = 20;
    /// Labels start fading once this number has been revealed
    pub const FADE_TRIGGER: u64 = 8;
    /// Opacity removed from every label per frame while fading
    pub const FADE_STEP: f32 = 0.01;

    /// Zoom defaults
    pub const ZOOM_INITIAL_DECAY: f32 = 0.998;
    pub const ZOOM_FLOOR: f32 = 0.05;
    pub const ZOOM_RELAX_STEP: f32 = 1e-5;

    /// Reveal pacing defaults (numbers per second)
    pub const PACER_INITIAL_RATE: f64 = 1.0;
    /// Rate is divided by this on every reveal event (1/0.92 ≈ 1.087x)
    pub const PACER_DECAY: f64 = 0.92;
    pub const PACER_RATE_CAP: f64 = 1_000.0;

    /// Upper bound on revealed integers; keeps GPU buffers finite
    pub const MAX_NUMBERS: u64 = 200_000;
}

/// Canvas dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center point of the canvas
    #[inline]
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// True when either side is zero (minimized window, detached canvas)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(consts::DEFAULT_CANVAS_WIDTH, consts::DEFAULT_CANVAS_HEIGHT)
    }
}
