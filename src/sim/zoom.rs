//! Zoom-out controller
//!
//! Shrinks the spiral group a little every frame so the growing spiral stays
//! on screen. Below the floor the per-frame decay relaxes toward 1, easing the
//! zoom to a stop instead of halting abruptly.

use serde::{Deserialize, Serialize};

use crate::settings::ZoomConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomController {
    scale: f32,
    decay: f32,
    config: ZoomConfig,
}

impl ZoomController {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            scale: 1.0,
            decay: config.initial_decay.min(1.0),
            config,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// True once the scale has dropped below the floor
    pub fn is_relaxing(&self) -> bool {
        self.scale < self.config.floor
    }

    /// True once the zoom has come to rest
    pub fn is_settled(&self) -> bool {
        self.decay >= 1.0
    }

    /// Advance one frame, returning the new scale
    pub fn tick(&mut self) -> f32 {
        self.scale *= self.decay;
        if self.is_relaxing() {
            self.decay = (self.decay + self.config.relax_step).min(1.0);
        }
        self.scale
    }
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick() {
        let mut zoom = ZoomController::default();
        assert_eq!(zoom.scale(), 1.0);
        assert!((zoom.tick() - 0.998).abs() < 1e-6);
        assert!(!zoom.is_relaxing());
    }

    #[test]
    fn test_strictly_decreasing_above_floor() {
        let mut zoom = ZoomController::default();
        let mut previous = zoom.scale();
        while !zoom.is_relaxing() {
            let scale = zoom.tick();
            assert!(scale < previous);
            previous = scale;
        }
        // 0.998^n < 0.05 after ~1500 frames
        assert!(previous < 0.05);
    }

    #[test]
    fn test_relaxes_toward_one() {
        let config = ZoomConfig {
            initial_decay: 0.9,
            floor: 0.5,
            relax_step: 0.01,
        };
        let mut zoom = ZoomController::new(config);
        while !zoom.is_relaxing() {
            zoom.tick();
        }

        let mut previous_decay = zoom.decay();
        let mut previous_scale = zoom.scale();
        let mut previous_drop = f32::INFINITY;
        while !zoom.is_settled() {
            let scale = zoom.tick();
            let drop = previous_scale - scale;
            assert!(zoom.decay() > previous_decay);
            assert!(zoom.decay() <= 1.0);
            assert!(drop <= previous_drop);
            previous_decay = zoom.decay();
            previous_drop = drop;
            previous_scale = scale;
        }

        // Settled: scale holds steady
        let settled = zoom.scale();
        for _ in 0..100 {
            assert_eq!(zoom.tick(), settled);
            assert_eq!(zoom.decay(), 1.0);
        }
    }
}
