use serde::Deserialize;

use crate::error::StarfieldResult;
use crate::profile::Tier;

/// Inclusive `(min, max)` range a star parameter is sampled from
pub type Span = (f64, f64);

/// Tunables for the starfield. Every field falls back to the built-in
/// defaults, so a page can override a single value.
#[derive(Debug, Clone, Deserialize)]
pub struct StarfieldConfig {
    #[serde(default)]
    pub tiers: TierTable,

    #[serde(default = "default_layers")]
    pub layers: [LayerConfig; 3],

    /// Smaller viewport side (CSS px) at or under which a touch device
    /// counts as a phone/tablet for the `balanced` tier
    #[serde(default = "default_touch_viewport_max")]
    pub touch_viewport_max: f64,

    /// Log frame-rate samples (defaults to on in debug builds)
    #[serde(default = "default_fps_monitor")]
    pub fps_monitor: bool,
}

/// Per-tier population and frame budget
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierSettings {
    /// Stars per square CSS pixel
    pub density: f64,
    pub min_stars: usize,
    pub max_stars: usize,
    pub max_pixel_ratio: f64,
    pub target_fps: f64,
    /// Nudge applied to the density estimate before clamping
    #[serde(default = "default_population_scale")]
    pub population_scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierTable {
    #[serde(default = "default_conserve")]
    pub conserve: TierSettings,
    #[serde(default = "default_balanced")]
    pub balanced: TierSettings,
    #[serde(default = "default_high")]
    pub high: TierSettings,
}

/// One depth band of stars. The last layer takes whatever the earlier
/// ratios leave over, so ratios need not sum to exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LayerConfig {
    pub ratio: f64,
    pub size: Span,
    pub alpha: Span,
    pub twinkle_speed: Span,
    pub twinkle_amplitude: Span,
    pub drift: Span,
}

fn default_conserve() -> TierSettings {
    TierSettings {
        density: 0.000035,
        min_stars: 48,
        max_stars: 180,
        max_pixel_ratio: 1.0,
        target_fps: 30.0,
        population_scale: 0.95,
    }
}

fn default_balanced() -> TierSettings {
    TierSettings {
        density: 0.000045,
        min_stars: 60,
        max_stars: 260,
        max_pixel_ratio: 1.15,
        target_fps: 45.0,
        population_scale: 1.0,
    }
}

fn default_high() -> TierSettings {
    TierSettings {
        density: 0.00005,
        min_stars: 72,
        max_stars: 360,
        max_pixel_ratio: 1.35,
        target_fps: 60.0,
        population_scale: 1.04,
    }
}

fn default_layers() -> [LayerConfig; 3] {
    [
        // distant
        LayerConfig {
            ratio: 0.5,
            size: (0.5, 1.2),
            alpha: (0.2, 0.52),
            twinkle_speed: (0.25, 0.5),
            twinkle_amplitude: (0.03, 0.09),
            drift: (0.2, 0.8),
        },
        LayerConfig {
            ratio: 0.33,
            size: (0.8, 1.7),
            alpha: (0.35, 0.72),
            twinkle_speed: (0.35, 0.62),
            twinkle_amplitude: (0.06, 0.14),
            drift: (0.6, 1.6),
        },
        // near
        LayerConfig {
            ratio: 0.17,
            size: (1.1, 2.2),
            alpha: (0.46, 0.9),
            twinkle_speed: (0.4, 0.75),
            twinkle_amplitude: (0.08, 0.18),
            drift: (1.2, 2.2),
        },
    ]
}

fn default_population_scale() -> f64 {
    1.0
}
fn default_touch_viewport_max() -> f64 {
    820.0
}
fn default_fps_monitor() -> bool {
    cfg!(debug_assertions)
}

impl TierTable {
    pub fn get(&self, tier: Tier) -> &TierSettings {
        match tier {
            Tier::Conserve => &self.conserve,
            Tier::Balanced => &self.balanced,
            Tier::High => &self.high,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            conserve: default_conserve(),
            balanced: default_balanced(),
            high: default_high(),
        }
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            tiers: TierTable::default(),
            layers: default_layers(),
            touch_viewport_max: default_touch_viewport_max(),
            fps_monitor: default_fps_monitor(),
        }
    }
}

impl StarfieldConfig {
    /// Parse a JSON override document
    pub fn from_json(json: &str) -> StarfieldResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
