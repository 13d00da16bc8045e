//! Cancelable frame loop
//!
//! Owns the spiral state, the render sink and the scheduler. Each delivered
//! frame runs one tick to completion, dispatches it and asks for the next
//! frame. Resize events are queued and merged at the next tick boundary.

use glam::Vec2;

use super::{CancelToken, FrameScheduler, LoopError};
use crate::CanvasSize;
use crate::renderer::{DrawDispatch, RenderSink};
use crate::sim::{SpiralState, TickInput, tick};

/// Result of delivering one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Frame drawn, next one requested
    Continue,
    /// Loop is stopped; nothing was drawn
    Stopped,
}

pub struct FrameLoop<R: RenderSink, S: FrameScheduler> {
    state: SpiralState,
    sink: R,
    scheduler: S,
    dispatch: DrawDispatch,
    token: CancelToken,
    pending_frame: Option<S::Handle>,
    pending_resize: Option<CanvasSize>,
    started: bool,
}

impl<R: RenderSink, S: FrameScheduler> FrameLoop<R, S> {
    pub fn new(state: SpiralState, sink: R, scheduler: S) -> Self {
        let dispatch = DrawDispatch::new(&state.settings.colors(), state.settings.block_size);
        Self {
            state,
            sink,
            scheduler,
            dispatch,
            token: CancelToken::new(),
            pending_frame: None,
            pending_resize: None,
            started: false,
        }
    }

    /// Present an empty first frame and schedule the loop.
    ///
    /// A sink failure here stops the loop before any tick runs.
    pub fn start(&mut self) -> Result<(), LoopError> {
        if self.token.is_cancelled() {
            return Err(LoopError::Stopped);
        }
        if self.started {
            return Ok(());
        }

        // Center of the block holding 1; the spiral zooms around it
        let layout = &self.state.layout;
        let pivot = layout.origin() + Vec2::splat(layout.block_size() / 2.0);
        self.sink.set_group_pivot(pivot);
        self.sink.set_group_scale(self.state.scale());
        if let Err(e) = self.sink.present() {
            self.stop();
            return Err(e.into());
        }

        self.schedule_next()?;
        self.started = true;
        log::info!(
            "Frame loop started ({}x{})",
            self.state.canvas.width,
            self.state.canvas.height
        );
        Ok(())
    }

    /// Run one frame delivered by the scheduler
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Result<FrameStatus, LoopError> {
        // The handle that delivered us is spent
        self.pending_frame = None;
        if self.token.is_cancelled() || !self.started {
            return Ok(FrameStatus::Stopped);
        }

        let input = TickInput {
            timestamp_ms,
            resize: self.pending_resize.take(),
        };
        let frame = tick(&mut self.state, &input);

        if let Err(e) = self.dispatch.apply(&mut self.sink, &self.state, &frame) {
            log::error!("Render failed at frame {}: {}", self.state.frame, e);
            self.stop();
            return Err(e.into());
        }

        self.schedule_next()?;
        Ok(FrameStatus::Continue)
    }

    /// Record a canvas resize; applied at the start of the next frame
    pub fn queue_resize(&mut self, size: CanvasSize) {
        if size.is_empty() {
            log::debug!("Ignoring empty canvas size");
            return;
        }
        self.pending_resize = Some(size);
    }

    /// Cancel the loop and any frame still pending
    pub fn stop(&mut self) {
        if !self.token.is_cancelled() {
            log::info!("Frame loop stopped after {} frames", self.state.frame);
        }
        self.token.cancel();
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.token.is_cancelled()
    }

    /// Clone of the loop's stop flag
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn state(&self) -> &SpiralState {
        &self.state
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn schedule_next(&mut self) -> Result<(), LoopError> {
        match self.scheduler.request_frame() {
            Ok(handle) => {
                self.pending_frame = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }
}

impl<R: RenderSink, S: FrameScheduler> Drop for FrameLoop<R, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualScheduler;
    use crate::renderer::HeadlessSink;

    type TestLoop = FrameLoop<HeadlessSink, ManualScheduler>;

    fn new_loop() -> TestLoop {
        FrameLoop::new(SpiralState::default(), HeadlessSink::recording(), ManualScheduler::new())
    }

    /// Deliver `frames` frames at 60 fps starting from `first`
    fn drive(frame_loop: &mut TestLoop, first: u32, frames: u32) {
        for i in first..first + frames {
            let delivered = frame_loop.scheduler.deliver();
            assert!(delivered.is_some(), "no frame pending at {}", i);
            let status = frame_loop.on_frame(i as f64 * 1000.0 / 60.0).unwrap();
            assert_eq!(status, FrameStatus::Continue);
        }
    }

    #[test]
    fn test_start_presents_and_schedules() {
        let mut frame_loop = new_loop();
        assert!(!frame_loop.is_running());
        frame_loop.start().unwrap();
        assert!(frame_loop.is_running());
        assert_eq!(frame_loop.sink().presents(), 1);
        assert_eq!(frame_loop.scheduler().pending().len(), 1);
        assert_eq!(frame_loop.sink().pivot(), Vec2::new(400.0, 300.0));

        // Starting twice does not double-schedule
        frame_loop.start().unwrap();
        assert_eq!(frame_loop.scheduler().pending().len(), 1);
    }

    #[test]
    fn test_frames_before_start_do_nothing() {
        let mut frame_loop = new_loop();
        assert_eq!(frame_loop.on_frame(0.0).unwrap(), FrameStatus::Stopped);
        assert_eq!(frame_loop.state().frame, 0);
    }

    #[test]
    fn test_runs_and_reveals() {
        let mut frame_loop = new_loop();
        frame_loop.start().unwrap();
        drive(&mut frame_loop, 0, 600);
        let revealed = frame_loop.state().revealed();
        assert!(revealed > 10);
        assert_eq!(frame_loop.sink().rects(), revealed);
        assert_eq!(frame_loop.scheduler().pending().len(), 1);
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let mut frame_loop = new_loop();
        frame_loop.start().unwrap();
        drive(&mut frame_loop, 0, 120);
        let token = frame_loop.token();
        frame_loop.stop();

        assert!(token.is_cancelled());
        assert!(!frame_loop.is_running());
        assert!(frame_loop.scheduler().pending().is_empty());
        assert_eq!(frame_loop.scheduler().cancelled().len(), 1);

        // A late callback that slipped through is a no-op
        let frames = frame_loop.state().frame;
        assert_eq!(frame_loop.on_frame(99_999.0).unwrap(), FrameStatus::Stopped);
        assert_eq!(frame_loop.state().frame, frames);
        assert!(frame_loop.scheduler().pending().is_empty());

        // And it cannot be restarted
        assert!(matches!(frame_loop.start(), Err(LoopError::Stopped)));
    }

    #[test]
    fn test_cancelled_token_stops_next_frame() {
        let mut frame_loop = new_loop();
        frame_loop.start().unwrap();
        drive(&mut frame_loop, 0, 60);

        // Cancel from outside without calling stop(), as teardown does mid-frame
        frame_loop.token().cancel();
        let frames = frame_loop.state().frame;
        frame_loop.scheduler.deliver();
        assert_eq!(frame_loop.on_frame(61_000.0).unwrap(), FrameStatus::Stopped);
        assert_eq!(frame_loop.state().frame, frames);
        assert!(frame_loop.scheduler().pending().is_empty());
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn test_resize_merged_at_tick_boundary() {
        let mut frame_loop = new_loop();
        frame_loop.start().unwrap();
        drive(&mut frame_loop, 0, 300);
        let revealed = frame_loop.state().revealed();
        let scale = frame_loop.state().scale();

        let size = CanvasSize::new(1280, 720);
        frame_loop.queue_resize(size);
        // Not applied until the next frame
        assert_eq!(frame_loop.state().canvas, CanvasSize::default());
        assert_eq!(frame_loop.sink().size(), None);

        drive(&mut frame_loop, 300, 1);
        assert_eq!(frame_loop.state().canvas, size);
        assert_eq!(frame_loop.sink().size(), Some(size));
        assert!(frame_loop.state().revealed() >= revealed);
        assert!(frame_loop.state().scale() < scale);
        assert!(frame_loop.is_running());
    }

    #[test]
    fn test_render_failure_stops_loop() {
        let mut frame_loop = new_loop();
        frame_loop.start().unwrap();
        frame_loop.sink.fail_labels(true);

        let mut result = Ok(FrameStatus::Continue);
        for i in 0..200 {
            frame_loop.scheduler.deliver();
            result = frame_loop.on_frame(i as f64 * 1000.0 / 60.0);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(LoopError::Render(_))));
        assert!(!frame_loop.is_running());
        assert!(frame_loop.scheduler().pending().is_empty());
    }
}
