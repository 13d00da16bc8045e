//! Visualization state
//!
//! Everything a running spiral owns across frames. Created on start and
//! dropped on teardown; never shared between instances.

use super::counter::IntegerCursor;
use super::labels::LabelSet;
use super::pacer::RevealPacer;
use super::spiral::SpiralLayout;
use super::zoom::ZoomController;
use crate::CanvasSize;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct SpiralState {
    pub settings: Settings,
    /// Current canvas size (updated by resize events)
    pub canvas: CanvasSize,
    pub pacer: RevealPacer,
    pub counter: IntegerCursor,
    pub layout: SpiralLayout,
    pub zoom: ZoomController,
    pub labels: LabelSet,
    /// Frames ticked so far
    pub frame: u64,
    /// Last revealed integer (0 before the first reveal)
    pub last_number: u64,
}

impl SpiralState {
    /// Create a fresh spiral centered on the given canvas
    pub fn new(settings: Settings, canvas: CanvasSize) -> Self {
        let settings = settings.sanitized();
        let layout = SpiralLayout::new(canvas.center(), settings.block_size, settings.colors());
        Self {
            pacer: RevealPacer::new(settings.pacer),
            counter: IntegerCursor::new(settings.max_numbers),
            zoom: ZoomController::new(settings.zoom),
            labels: LabelSet::default(),
            layout,
            canvas,
            settings,
            frame: 0,
            last_number: 0,
        }
    }

    /// How many integers have been revealed
    pub fn revealed(&self) -> u64 {
        self.counter.issued()
    }

    /// Current group scale
    pub fn scale(&self) -> f32 {
        self.zoom.scale()
    }
}

impl Default for SpiralState {
    fn default() -> Self {
        Self::new(Settings::default(), CanvasSize::default())
    }
}
