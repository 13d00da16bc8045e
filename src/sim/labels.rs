//! Number labels and their one-way fade

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{FADE_STEP, FADE_TRIGGER};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub number: u64,
    /// Block center, canvas space
    pub center: Vec2,
    /// 0.0 (hidden) - 1.0 (opaque)
    pub opacity: f32,
}

/// Labels in reveal order, plus the fade state shared by all of them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Vec<Label>,
    fading: bool,
    trigger: u64,
    step: f32,
}

impl LabelSet {
    pub fn new(trigger: u64, step: f32) -> Self {
        Self {
            labels: Vec::new(),
            fading: false,
            trigger,
            step,
        }
    }

    /// Track a new label; returns its index
    pub fn push(&mut self, number: u64, center: Vec2) -> usize {
        self.labels.push(Label {
            number,
            center,
            opacity: 1.0,
        });
        self.labels.len() - 1
    }

    /// Note that `number` has been revealed. Returns true if this started the fade.
    pub fn observe_reveal(&mut self, number: u64) -> bool {
        if !self.fading && number >= self.trigger {
            self.fading = true;
            return true;
        }
        false
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    /// True once fading has started and every label is fully transparent
    pub fn is_faded_out(&self) -> bool {
        self.fading && self.labels.iter().all(|l| l.opacity == 0.0)
    }

    /// Apply one frame of fade. Returns true if any opacity changed.
    pub fn fade_step(&mut self) -> bool {
        if !self.fading {
            return false;
        }
        let mut changed = false;
        for label in &mut self.labels {
            if label.opacity > 0.0 {
                label.opacity = (label.opacity - self.step).max(0.0);
                changed = true;
            }
        }
        changed
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new(FADE_TRIGGER, FADE_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_fade_before_trigger() {
        let mut labels = LabelSet::default();
        for n in 1..FADE_TRIGGER {
            labels.push(n, Vec2::ZERO);
            assert!(!labels.observe_reveal(n));
            assert!(!labels.fade_step());
        }
        assert!(labels.labels().iter().all(|l| l.opacity == 1.0));
    }

    #[test]
    fn test_trigger_fires_once() {
        let mut labels = LabelSet::default();
        assert!(labels.observe_reveal(FADE_TRIGGER));
        assert!(!labels.observe_reveal(FADE_TRIGGER + 1));
        assert!(labels.is_fading());
    }

    #[test]
    fn test_fades_to_exactly_zero() {
        let mut labels = LabelSet::default();
        labels.push(1, Vec2::ZERO);
        labels.push(2, Vec2::ONE);
        labels.observe_reveal(FADE_TRIGGER);

        let mut frames = 0;
        while labels.fade_step() {
            frames += 1;
            assert!(frames < 1000);
        }
        // 1.0 / 0.01, give or take float rounding on the last step
        assert!((99..=101).contains(&frames));
        assert!(labels.is_faded_out());
        assert!(labels.labels().iter().all(|l| l.opacity == 0.0));

        // Stays at zero
        assert!(!labels.fade_step());
        assert!(labels.labels().iter().all(|l| l.opacity == 0.0));
    }

    #[test]
    fn test_late_label_starts_opaque() {
        let mut labels = LabelSet::default();
        labels.push(1, Vec2::ZERO);
        labels.observe_reveal(FADE_TRIGGER);
        for _ in 0..50 {
            labels.fade_step();
        }
        let idx = labels.push(12, Vec2::ZERO);
        assert_eq!(labels.labels()[idx].opacity, 1.0);
        assert!(labels.labels()[0].opacity < 0.6);
    }

    proptest! {
        #[test]
        fn opacity_never_increases_or_goes_negative(step in 0.001f32..0.5, frames in 1usize..400) {
            let mut labels = LabelSet::new(1, step);
            labels.push(1, Vec2::ZERO);
            labels.observe_reveal(1);
            let mut previous = 1.0;
            for _ in 0..frames {
                labels.fade_step();
                let opacity = labels.labels()[0].opacity;
                prop_assert!(opacity <= previous);
                prop_assert!(opacity >= 0.0);
                previous = opacity;
            }
        }
    }
}
