//! Frame output -> render sink calls

use super::{LabelHandle, LabelStyle, RenderError, RenderSink};
use crate::settings::Theme;
use crate::sim::{FrameOutput, SpiralState};

/// Label font size relative to the block edge
const LABEL_FONT_RATIO: f32 = 0.5;

/// Issues draw calls for each frame and remembers the label handles
#[derive(Debug, Clone)]
pub struct DrawDispatch {
    handles: Vec<LabelHandle>,
    style: LabelStyle,
}

impl DrawDispatch {
    pub fn new(theme: &Theme, block_size: f32) -> Self {
        Self {
            handles: Vec::new(),
            style: LabelStyle {
                color: theme.label,
                font_px: block_size * LABEL_FONT_RATIO,
            },
        }
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Label handles, in the same order as `state.labels`
    pub fn handles(&self) -> &[LabelHandle] {
        &self.handles
    }

    /// Push one frame to the sink. Either every call is issued or the first
    /// failing one is returned.
    pub fn apply<R: RenderSink>(
        &mut self,
        sink: &mut R,
        state: &SpiralState,
        frame: &FrameOutput,
    ) -> Result<(), RenderError> {
        if let Some(size) = frame.resized {
            sink.resize(size);
        }

        for block in &frame.blocks {
            sink.draw_rect(
                block.position.x,
                block.position.y,
                block.size,
                block.size,
                block.color,
            );
            if let Some(label) = &block.label {
                let handle = sink.draw_text(&label.text, label.center, &self.style)?;
                self.handles.push(handle);
            }
        }

        if frame.labels_faded {
            for (handle, label) in self.handles.iter().zip(state.labels.labels()) {
                sink.set_opacity(*handle, label.opacity);
            }
        }

        sink.set_group_scale(frame.scale);
        sink.present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::{HeadlessSink, SinkOp};
    use crate::sim::{TickInput, tick};

    fn run_frames(state: &mut SpiralState, sink: &mut HeadlessSink, dispatch: &mut DrawDispatch, frames: u32) {
        for i in 0..frames {
            let out = tick(state, &TickInput::at(i as f64 * 1000.0 / 60.0));
            dispatch.apply(sink, state, &out).unwrap();
        }
    }

    #[test]
    fn test_one_rect_per_block_and_one_present_per_frame() {
        let mut state = SpiralState::default();
        let mut sink = HeadlessSink::recording();
        let mut dispatch = DrawDispatch::new(&state.settings.colors(), state.settings.block_size);
        run_frames(&mut state, &mut sink, &mut dispatch, 600);

        assert_eq!(sink.rects(), state.revealed());
        assert_eq!(sink.presents(), 600);
        assert_eq!(dispatch.handles().len(), state.labels.len());
        assert_eq!(sink.scale(), state.scale());
    }

    #[test]
    fn test_label_opacity_follows_fade() {
        let mut state = SpiralState::default();
        let mut sink = HeadlessSink::recording();
        let mut dispatch = DrawDispatch::new(&state.settings.colors(), state.settings.block_size);
        run_frames(&mut state, &mut sink, &mut dispatch, 900);

        assert!(state.labels.is_fading());
        for (handle, label) in dispatch.handles().iter().zip(state.labels.labels()) {
            assert_eq!(sink.label_opacity(*handle), Some(label.opacity));
        }
        let texts: Vec<_> = sink
            .ops()
            .iter()
            .filter_map(|op| match op {
                SinkOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = (1..=texts.len()).map(|n| n.to_string()).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_label_failure_propagates() {
        let mut state = SpiralState::default();
        let mut sink = HeadlessSink::recording();
        sink.fail_labels(true);
        let mut dispatch = DrawDispatch::new(&state.settings.colors(), state.settings.block_size);

        let mut failed = false;
        for i in 0..200 {
            let out = tick(&mut state, &TickInput::at(i as f64 * 1000.0 / 60.0));
            if dispatch.apply(&mut sink, &state, &out).is_err() {
                failed = true;
                break;
            }
        }
        assert!(failed, "block 1 carries a label, so dispatch must fail");
    }
}
