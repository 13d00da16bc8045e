//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (requestAnimationFrame on web, manual elsewhere)
//! - Cancellation of the frame loop on teardown

pub mod frame_loop;
#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use frame_loop::{FrameLoop, FrameStatus};

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::renderer::RenderError;

/// Shared stop flag for one frame loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Frame loop failures
#[derive(Debug, Error)]
pub enum LoopError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("could not schedule frame: {0}")]
    Schedule(String),
    #[error("frame loop was stopped")]
    Stopped,
}

/// Mount-time failures; the loop never starts after one of these
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no browser window")]
    NoWindow,
    #[error("no element with id '{0}'")]
    NoCanvas(String),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("cannot create surface: {0}")]
    Surface(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Loop(#[from] LoopError),
    #[error("DOM error: {0}")]
    Dom(String),
}

/// Host-provided "call me on the next display refresh"
pub trait FrameScheduler {
    type Handle;

    /// Schedule one callback for the next frame
    fn request_frame(&mut self) -> Result<Self::Handle, LoopError>;

    /// Drop a callback that has not run yet
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Scheduler for hosts that drive frames themselves (native runner, tests)
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u32,
    pending: Vec<u32>,
    cancelled: Vec<u32>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and neither delivered nor cancelled
    pub fn pending(&self) -> &[u32] {
        &self.pending
    }

    pub fn cancelled(&self) -> &[u32] {
        &self.cancelled
    }

    /// Mark the oldest pending frame as delivered; returns its handle
    pub fn deliver(&mut self) -> Option<u32> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualScheduler {
    type Handle = u32;

    fn request_frame(&mut self) -> Result<u32, LoopError> {
        self.next_handle += 1;
        self.pending.push(self.next_handle);
        Ok(self.next_handle)
    }

    fn cancel_frame(&mut self, handle: u32) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}
