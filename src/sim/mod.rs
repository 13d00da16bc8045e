//! Deterministic spiral engine
//!
//! All visualization logic lives here. This module must stay pure:
//! - Time only arrives through `TickInput`
//! - Stable reveal order (ascending integers)
//! - No rendering or platform dependencies

pub mod counter;
pub mod labels;
pub mod pacer;
pub mod prime;
pub mod spiral;
pub mod state;
pub mod tick;
pub mod zoom;

pub use counter::IntegerCursor;
pub use labels::{Label, LabelSet};
pub use pacer::RevealPacer;
pub use prime::{is_prime, is_prime_u64};
pub use spiral::{Direction, DrawCommand, LabelSpec, SpiralCursor, SpiralLayout};
pub use state::SpiralState;
pub use tick::{FrameOutput, TickInput, tick};
pub use zoom::ZoomController;
