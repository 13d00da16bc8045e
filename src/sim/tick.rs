//! Per-frame step
//!
//! Pure function of the state and the frame input: reveals the numbers that
//! are due, lays them out, then advances the label fade and the zoom.

use super::spiral::DrawCommand;
use super::state::SpiralState;
use crate::CanvasSize;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Host timestamp (ms, e.g. from requestAnimationFrame)
    pub timestamp_ms: f64,
    /// Canvas resize that arrived since the last frame
    pub resize: Option<CanvasSize>,
}

impl TickInput {
    pub fn at(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            resize: None,
        }
    }
}

/// What changed this frame, for the renderer
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Newly revealed blocks, in reveal order
    pub blocks: Vec<DrawCommand>,
    /// Group scale after this frame's zoom step
    pub scale: f32,
    /// Label opacities changed this frame
    pub labels_faded: bool,
    /// Canvas size applied at the start of this frame
    pub resized: Option<CanvasSize>,
}

/// Advance the visualization by one frame
pub fn tick(state: &mut SpiralState, input: &TickInput) -> FrameOutput {
    state.frame += 1;

    let resized = input.resize.filter(|size| *size != state.canvas);
    if let Some(size) = resized {
        log::debug!("Canvas resized to {}x{}", size.width, size.height);
        state.canvas = size;
    }

    let due = state.pacer.reveal_count_since(input.timestamp_ms);
    let numbers = state.counter.next_n(due);
    if due > 0 && numbers.is_empty() && state.counter.is_exhausted() {
        log::trace!("Counter exhausted at {}", state.counter.limit());
    }

    let mut blocks = Vec::with_capacity(numbers.end.saturating_sub(numbers.start) as usize);
    for number in numbers {
        let command = state.layout.advance(number);
        if let Some(label) = &command.label {
            state.labels.push(number, label.center);
        }
        if state.labels.observe_reveal(number) {
            log::info!("Label fade started at {}", number);
        }
        state.last_number = number;
        blocks.push(command);
    }
    if !blocks.is_empty() {
        log::trace!(
            "Frame {}: revealed {} (rate {:.2}/s)",
            state.frame,
            blocks.len(),
            state.pacer.rate()
        );
    }

    let labels_faded = state.labels.fade_step();

    let was_relaxing = state.zoom.is_relaxing();
    let scale = state.zoom.tick();
    if !was_relaxing && state.zoom.is_relaxing() {
        log::info!("Zoom floor reached at frame {}", state.frame);
    }

    FrameOutput {
        blocks,
        scale,
        labels_faded,
        resized,
    }
}
