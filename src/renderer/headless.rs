//! Render sink without a screen
//!
//! Counts what would have been drawn. Used by the native runner and, with
//! recording switched on, by tests that inspect the exact call sequence.

use glam::Vec2;

use super::{LabelHandle, LabelStyle, RenderError, RenderSink};
use crate::CanvasSize;
use crate::settings::Rgba;

/// A recorded sink call
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    Rect { x: f32, y: f32, w: f32, h: f32, color: Rgba },
    Text { text: String, center: Vec2 },
    Opacity { label: LabelHandle, opacity: f32 },
    Pivot(Vec2),
    Scale(f32),
    Resize(CanvasSize),
    Present,
}

#[derive(Debug, Clone)]
pub struct HeadlessSink {
    record: bool,
    ops: Vec<SinkOp>,
    rects: u64,
    colored: Vec<(Rgba, u64)>,
    label_opacity: Vec<f32>,
    pivot: Vec2,
    scale: f32,
    size: Option<CanvasSize>,
    presents: u64,
    fail_labels: bool,
}

impl HeadlessSink {
    /// Counting only
    pub fn new() -> Self {
        Self {
            record: false,
            ops: Vec::new(),
            rects: 0,
            colored: Vec::new(),
            label_opacity: Vec::new(),
            pivot: Vec2::ZERO,
            scale: 1.0,
            size: None,
            presents: 0,
            fail_labels: false,
        }
    }

    /// Counting plus a full log of calls
    pub fn recording() -> Self {
        Self {
            record: true,
            ..Self::new()
        }
    }

    /// Make `draw_text` fail, to exercise error paths
    pub fn fail_labels(&mut self, fail: bool) {
        self.fail_labels = fail;
    }

    pub fn ops(&self) -> &[SinkOp] {
        &self.ops
    }

    pub fn rects(&self) -> u64 {
        self.rects
    }

    /// Rectangles drawn with `color`
    pub fn rects_with_color(&self, color: Rgba) -> u64 {
        self.colored
            .iter()
            .find(|(c, _)| *c == color)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn labels(&self) -> usize {
        self.label_opacity.len()
    }

    pub fn label_opacity(&self, label: LabelHandle) -> Option<f32> {
        self.label_opacity.get(label.0).copied()
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn size(&self) -> Option<CanvasSize> {
        self.size
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    fn log(&mut self, op: SinkOp) {
        if self.record {
            self.ops.push(op);
        }
    }
}

impl Default for HeadlessSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for HeadlessSink {
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.rects += 1;
        match self.colored.iter_mut().find(|(c, _)| *c == color) {
            Some((_, n)) => *n += 1,
            None => self.colored.push((color, 1)),
        }
        self.log(SinkOp::Rect { x, y, w, h, color });
    }

    fn draw_text(
        &mut self,
        text: &str,
        center: Vec2,
        _style: &LabelStyle,
    ) -> Result<LabelHandle, RenderError> {
        if self.fail_labels {
            return Err(RenderError::Dom(format!("cannot create label '{}'", text)));
        }
        self.label_opacity.push(1.0);
        self.log(SinkOp::Text {
            text: text.to_string(),
            center,
        });
        Ok(LabelHandle(self.label_opacity.len() - 1))
    }

    fn set_opacity(&mut self, label: LabelHandle, opacity: f32) {
        if let Some(slot) = self.label_opacity.get_mut(label.0) {
            *slot = opacity;
        }
        self.log(SinkOp::Opacity { label, opacity });
    }

    fn set_group_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
        self.log(SinkOp::Pivot(pivot));
    }

    fn set_group_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.log(SinkOp::Scale(scale));
    }

    fn resize(&mut self, size: CanvasSize) {
        self.size = Some(size);
        self.log(SinkOp::Resize(size));
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.presents += 1;
        self.log(SinkOp::Present);
        Ok(())
    }
}
