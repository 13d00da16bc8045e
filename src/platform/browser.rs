//! requestAnimationFrame scheduling

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{FrameScheduler, LoopError};

/// Callback invoked with the rAF timestamp (ms)
pub type FrameCallback = Closure<dyn FnMut(f64)>;

/// Schedules frames on the browser's display refresh.
///
/// The callback lives in a shared slot so it can be installed after the
/// frame loop that owns this scheduler has been built, and dropped on
/// teardown.
pub struct BrowserScheduler {
    window: web_sys::Window,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl BrowserScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    /// Shared slot holding the frame callback
    pub fn callback_slot(&self) -> Rc<RefCell<Option<FrameCallback>>> {
        self.callback.clone()
    }
}

impl FrameScheduler for BrowserScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> Result<i32, LoopError> {
        let slot = self.callback.borrow();
        let callback = slot
            .as_ref()
            .ok_or_else(|| LoopError::Schedule("no frame callback installed".into()))?;
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| LoopError::Schedule(format!("{:?}", e)))
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }
}
