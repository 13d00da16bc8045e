//! Reveal pacing
//!
//! Decides how many new numbers a frame may reveal. The rate starts slow and
//! accelerates geometrically on every reveal event until it hits the cap.

use serde::{Deserialize, Serialize};

use crate::settings::PacerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealPacer {
    /// Timestamp of the last reveal event (None before the first frame)
    last_reveal_ms: Option<f64>,
    /// Current rate in numbers per second
    rate_per_sec: f64,
    config: PacerConfig,
}

impl RevealPacer {
    pub fn new(config: PacerConfig) -> Self {
        Self {
            last_reveal_ms: None,
            rate_per_sec: config.initial_rate,
            config,
        }
    }

    /// Current reveal rate (numbers per second)
    pub fn rate(&self) -> f64 {
        self.rate_per_sec
    }

    /// Milliseconds between two reveals at the current rate
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.rate_per_sec
    }

    pub fn last_reveal_ms(&self) -> Option<f64> {
        self.last_reveal_ms
    }

    /// Number of reveals due at `now_ms`.
    ///
    /// The first call only anchors the clock and returns 0.
    pub fn reveal_count_since(&mut self, now_ms: f64) -> u64 {
        let Some(last) = self.last_reveal_ms else {
            self.last_reveal_ms = Some(now_ms);
            return 0;
        };

        let elapsed = now_ms - last;
        if !(elapsed > 0.0) {
            return 0;
        }

        let count = (elapsed / self.interval_ms()).floor() as u64;
        if count > 0 {
            self.last_reveal_ms = Some(now_ms);
            if self.rate_per_sec < self.config.rate_cap {
                self.rate_per_sec = (self.rate_per_sec / self.config.decay).min(self.config.rate_cap);
            }
        }
        count
    }
}

impl Default for RevealPacer {
    fn default() -> Self {
        Self::new(PacerConfig::default())
    }
}
