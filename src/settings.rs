//! Visualization settings and themes
//!
//! Persisted in LocalStorage on the web; a `?theme=` query parameter
//! overrides the stored theme for one page load.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// RGBA color, components in 0.0 - 1.0
pub type Rgba = [f32; 4];

/// Theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemePreset {
    #[default]
    Classic,
    Night,
    Paper,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 3] = [ThemePreset::Classic, ThemePreset::Night, ThemePreset::Paper];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreset::Classic => "Classic",
            ThemePreset::Night => "Night",
            ThemePreset::Paper => "Paper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "default" => Some(ThemePreset::Classic),
            "night" | "dark" => Some(ThemePreset::Night),
            "paper" | "light" => Some(ThemePreset::Paper),
            _ => None,
        }
    }

    /// Colors for this preset
    pub fn theme(&self) -> Theme {
        match self {
            ThemePreset::Classic => Theme {
                prime: [0.95, 0.77, 0.2, 1.0],
                composite: [0.16, 0.2, 0.3, 1.0],
                background: [0.02, 0.02, 0.05, 1.0],
                label: [1.0, 1.0, 1.0, 1.0],
            },
            ThemePreset::Night => Theme {
                prime: [0.4, 0.7, 1.0, 1.0],
                composite: [0.08, 0.06, 0.14, 1.0],
                background: [0.0, 0.0, 0.02, 1.0],
                label: [0.85, 0.9, 1.0, 1.0],
            },
            ThemePreset::Paper => Theme {
                prime: [0.1, 0.1, 0.12, 1.0],
                composite: [0.88, 0.86, 0.8, 1.0],
                background: [1.0, 1.0, 0.98, 1.0],
                label: [0.6, 0.1, 0.1, 1.0],
            },
        }
    }
}

/// Block palette: exactly two block colors, plus what the renderer needs around them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Fill for prime numbers
    pub prime: Rgba,
    /// Fill for everything else (including 1)
    pub composite: Rgba,
    /// Clear color
    pub background: Rgba,
    /// Label text color
    pub label: Rgba,
}

impl Theme {
    /// Pick the block color for a number
    #[inline]
    pub fn block_color(&self, prime: bool) -> Rgba {
        if prime { self.prime } else { self.composite }
    }
}

/// CSS `rgba()` string for DOM styling
pub fn css_color(color: Rgba) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Reveal pacing tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacerConfig {
    /// Starting reveal rate (numbers per second)
    pub initial_rate: f64,
    /// Rate is divided by this after every reveal event (< 1 accelerates)
    pub decay: f64,
    /// Upper bound on the reveal rate
    pub rate_cap: f64,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            initial_rate: PACER_INITIAL_RATE,
            decay: PACER_DECAY,
            rate_cap: PACER_RATE_CAP,
        }
    }
}

/// Zoom-out tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// Per-frame scale multiplier at start (< 1)
    pub initial_decay: f32,
    /// Scale below which the zoom-out starts to relax
    pub floor: f32,
    /// Added to the decay each frame while relaxing
    pub relax_step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial_decay: ZOOM_INITIAL_DECAY,
            floor: ZOOM_FLOOR,
            relax_step: ZOOM_RELAX_STEP,
        }
    }
}

/// Visualization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Color theme
    pub theme: ThemePreset,
    /// Block edge length in canvas pixels
    #[serde(default = "default_block_size")]
    pub block_size: f32,
    /// Highest number that will ever be revealed
    #[serde(default = "default_max_numbers")]
    pub max_numbers: u64,
    #[serde(default)]
    pub pacer: PacerConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
}

fn default_block_size() -> f32 {
    BLOCK_SIZE
}

fn default_max_numbers() -> u64 {
    MAX_NUMBERS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemePreset::Classic,
            block_size: BLOCK_SIZE,
            max_numbers: MAX_NUMBERS,
            pacer: PacerConfig::default(),
            zoom: ZoomConfig::default(),
        }
    }
}

impl Settings {
    /// Resolved theme colors
    pub fn colors(&self) -> Theme {
        self.theme.theme()
    }

    /// Clamp tunables into ranges the engine can run with
    pub fn sanitized(mut self) -> Self {
        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            log::warn!("Invalid block size {}, using default", self.block_size);
            self.block_size = BLOCK_SIZE;
        }
        if !(self.pacer.initial_rate.is_finite() && self.pacer.initial_rate > 0.0) {
            self.pacer.initial_rate = PACER_INITIAL_RATE;
        }
        if !(self.pacer.decay > 0.0 && self.pacer.decay <= 1.0) {
            self.pacer.decay = PACER_DECAY;
        }
        if !(self.pacer.rate_cap >= self.pacer.initial_rate) {
            self.pacer.rate_cap = PACER_RATE_CAP.max(self.pacer.initial_rate);
        }
        if !(self.zoom.initial_decay > 0.0 && self.zoom.initial_decay <= 1.0) {
            self.zoom.initial_decay = ZOOM_INITIAL_DECAY;
        }
        if !(self.zoom.floor.is_finite() && self.zoom.floor > 0.0 && self.zoom.floor < 1.0) {
            self.zoom.floor = ZOOM_FLOOR;
        }
        if !(self.zoom.relax_step.is_finite() && self.zoom.relax_step > 0.0) {
            log::warn!("Invalid zoom relax step {}, using default", self.zoom.relax_step);
            self.zoom.relax_step = ZOOM_RELAX_STEP;
        }
        self.max_numbers = self.max_numbers.clamp(1, MAX_NUMBERS);
        self
    }

    /// Copy with the theme named by a `?theme=` value; unknown names keep
    /// the current theme
    pub fn with_theme_override(&self, name: Option<&str>) -> Self {
        let mut settings = self.clone();
        if let Some(name) = name {
            match ThemePreset::from_str(name) {
                Some(preset) => settings.theme = preset,
                None => log::warn!("Unknown theme '{}'", name),
            }
        }
        settings
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "prime_spiral_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let settings = storage
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|json| match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    Some(settings)
                }
                Err(e) => {
                    log::warn!("Ignoring stored settings: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        settings.sanitized()
    }

    /// Settings for this page load: stored settings plus `?theme=` (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn with_query_overrides(&self) -> Self {
        let query_theme = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
            .and_then(|params| params.get("theme"));
        self.with_theme_override(query_theme.as_deref())
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_query_overrides(&self) -> Self {
        self.clone()
    }
}
