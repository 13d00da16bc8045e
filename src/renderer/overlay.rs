//! Browser render sink
//!
//! Blocks go to the WebGPU pipeline; labels are absolutely positioned DOM
//! elements over the canvas, moved with the same group transform.

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

use super::pipeline::BlockRenderState;
use super::vertex::BlockInstance;
use super::{LabelHandle, LabelStyle, RenderError, RenderSink};
use crate::CanvasSize;
use crate::settings::{Rgba, css_color};

fn dom_err(e: wasm_bindgen::JsValue) -> RenderError {
    RenderError::Dom(format!("{:?}", e))
}

struct OverlayLabel {
    element: HtmlElement,
    center: Vec2,
    font_px: f32,
    opacity: f32,
}

/// DOM layer holding the text labels
pub struct LabelOverlay {
    document: Document,
    container: HtmlElement,
    labels: Vec<OverlayLabel>,
}

impl LabelOverlay {
    /// Insert an overlay container next to `canvas`
    pub fn attach(document: &Document, canvas: &HtmlCanvasElement) -> Result<Self, RenderError> {
        let container: HtmlElement = document
            .create_element("div")
            .map_err(dom_err)?
            .dyn_into()
            .map_err(|_| RenderError::Dom("overlay is not an HtmlElement".into()))?;
        container.set_id("spiral-labels");
        let style = container.style();
        for (name, value) in [
            ("position", "absolute"),
            ("left", "0"),
            ("top", "0"),
            ("width", "100%"),
            ("height", "100%"),
            ("overflow", "hidden"),
            ("pointer-events", "none"),
        ] {
            style.set_property(name, value).map_err(dom_err)?;
        }

        let parent = canvas
            .parent_element()
            .ok_or_else(|| RenderError::Dom("canvas has no parent".into()))?;
        if let Some(parent) = parent.dyn_ref::<HtmlElement>() {
            parent.style().set_property("position", "relative").map_err(dom_err)?;
        }
        parent.append_child(&container).map_err(dom_err)?;

        Ok(Self {
            document: document.clone(),
            container,
            labels: Vec::new(),
        })
    }

    pub fn add(&mut self, text: &str, center: Vec2, style: &LabelStyle) -> Result<LabelHandle, RenderError> {
        let element: HtmlElement = self
            .document
            .create_element("div")
            .map_err(dom_err)?
            .dyn_into()
            .map_err(|_| RenderError::Dom("label is not an HtmlElement".into()))?;
        element.set_text_content(Some(text));
        let css = element.style();
        for (name, value) in [
            ("position", "absolute"),
            ("transform", "translate(-50%, -50%)"),
            ("font-family", "monospace"),
            ("white-space", "nowrap"),
        ] {
            css.set_property(name, value).map_err(dom_err)?;
        }
        css.set_property("color", &css_color(style.color)).map_err(dom_err)?;
        self.container.append_child(&element).map_err(dom_err)?;

        self.labels.push(OverlayLabel {
            element,
            center,
            font_px: style.font_px,
            opacity: 1.0,
        });
        Ok(LabelHandle(self.labels.len() - 1))
    }

    pub fn set_opacity(&mut self, label: LabelHandle, opacity: f32) {
        if let Some(entry) = self.labels.get_mut(label.0) {
            entry.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Move every label to its transformed position
    pub fn layout(&self, pivot: Vec2, center: Vec2, scale: f32) -> Result<(), RenderError> {
        for label in &self.labels {
            let css = label.element.style();
            if label.opacity <= 0.0 {
                css.set_property("display", "none").map_err(dom_err)?;
                continue;
            }
            let screen = center + (label.center - pivot) * scale;
            css.set_property("left", &format!("{:.2}px", screen.x)).map_err(dom_err)?;
            css.set_property("top", &format!("{:.2}px", screen.y)).map_err(dom_err)?;
            css.set_property("font-size", &format!("{:.2}px", label.font_px * scale))
                .map_err(dom_err)?;
            css.set_property("opacity", &format!("{:.3}", label.opacity)).map_err(dom_err)?;
        }
        Ok(())
    }
}

impl Drop for LabelOverlay {
    fn drop(&mut self) {
        self.container.remove();
    }
}

/// WebGPU blocks plus DOM labels
pub struct WebSink {
    pub blocks: BlockRenderState,
    pub labels: LabelOverlay,
    pivot: Vec2,
    scale: f32,
}

impl WebSink {
    pub fn new(blocks: BlockRenderState, labels: LabelOverlay) -> Self {
        let pivot = blocks.size.center();
        Self {
            blocks,
            labels,
            pivot,
            scale: 1.0,
        }
    }
}

impl RenderSink for WebSink {
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.blocks.push_block(BlockInstance::new(x, y, w, h, color));
    }

    fn draw_text(
        &mut self,
        text: &str,
        center: Vec2,
        style: &LabelStyle,
    ) -> Result<LabelHandle, RenderError> {
        self.labels.add(text, center, style)
    }

    fn set_opacity(&mut self, label: LabelHandle, opacity: f32) {
        self.labels.set_opacity(label, opacity);
    }

    fn set_group_pivot(&mut self, pivot: Vec2) {
        self.pivot = pivot;
        self.blocks.set_pivot(pivot);
    }

    fn set_group_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.blocks.set_scale(scale);
    }

    fn resize(&mut self, size: CanvasSize) {
        self.blocks.resize(size);
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.blocks.render()?;
        self.labels
            .layout(self.pivot, self.blocks.size.center(), self.scale)
    }
}
