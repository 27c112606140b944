use crate::config::{StarfieldConfig, TierSettings};
use crate::constants::{DEFAULT_CORES, DEFAULT_MEMORY_GB, DEFAULT_PIXEL_RATIO};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Conserve,
    Balanced,
    High,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Conserve => "conserve",
            Tier::Balanced => "balanced",
            Tier::High => "high",
        }
    }
}

/// Read-only view of the device the engine runs on. Missing hints are
/// substituted, not errors: 4 cores, 4 GB memory, pixel ratio 1.0.
pub trait CapabilityQuery {
    fn hardware_concurrency(&self) -> Option<u32>;
    fn device_memory_gb(&self) -> Option<f64>;
    fn touch_capable(&self) -> bool;
    fn device_pixel_ratio(&self) -> Option<f64>;
}

/// Plain capability snapshot, used for synthetic hints and as the value the
/// browser host fills in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceHints {
    pub cores: Option<u32>,
    pub memory_gb: Option<f64>,
    pub touch: bool,
    pub pixel_ratio: Option<f64>,
}

impl CapabilityQuery for DeviceHints {
    fn hardware_concurrency(&self) -> Option<u32> {
        self.cores
    }

    fn device_memory_gb(&self) -> Option<f64> {
        self.memory_gb
    }

    fn touch_capable(&self) -> bool {
        self.touch
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.pixel_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProfile {
    pub tier: Tier,
    pub density: f64,
    pub min_stars: usize,
    pub max_stars: usize,
    pub max_pixel_ratio: f64,
    pub target_fps: f64,
    pub population_scale: f64,
}

impl RenderProfile {
    fn from_settings(tier: Tier, s: &TierSettings) -> Self {
        // Keep the bounds ordered and the frame rate positive even if a
        // page override is nonsense.
        let target_fps = if s.target_fps.is_finite() && s.target_fps > 0.0 { s.target_fps } else { 60.0 };
        let max_pixel_ratio = if s.max_pixel_ratio > 0.0 { s.max_pixel_ratio } else { 1.0 };
        Self {
            tier,
            density: s.density.max(0.0),
            min_stars: s.min_stars,
            max_stars: s.max_stars.max(s.min_stars),
            max_pixel_ratio,
            target_fps,
            population_scale: s.population_scale.max(0.0),
        }
    }

    /// Minimum time between drawn frames
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }

    /// Device pixel ratio capped to this tier's budget
    pub fn pixel_ratio(&self, device_ratio: Option<f64>) -> f64 {
        let ratio = device_ratio
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_PIXEL_RATIO);
        ratio.min(self.max_pixel_ratio)
    }
}

/// Pick the capability tier. First match wins:
/// low cores or memory, then small touch viewports, then everything else.
pub fn resolve_tier(hints: &impl CapabilityQuery, touch_viewport_max: f64, viewport_width: f64, viewport_height: f64) -> Tier {
    let cores = hints.hardware_concurrency().unwrap_or(DEFAULT_CORES);
    let memory = hints.device_memory_gb().unwrap_or(DEFAULT_MEMORY_GB);

    if cores <= 4 || memory <= 4.0 {
        Tier::Conserve
    } else if viewport_width.min(viewport_height) <= touch_viewport_max && hints.touch_capable() {
        Tier::Balanced
    } else {
        Tier::High
    }
}

pub fn resolve_render_profile(
    hints: &impl CapabilityQuery,
    config: &StarfieldConfig,
    viewport_width: f64,
    viewport_height: f64,
) -> RenderProfile {
    let tier = resolve_tier(hints, config.touch_viewport_max, viewport_width, viewport_height);
    RenderProfile::from_settings(tier, config.tiers.get(tier))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong(touch: bool) -> DeviceHints {
        DeviceHints {
            cores: Some(8),
            memory_gb: Some(8.0),
            touch,
            pixel_ratio: Some(2.0),
        }
    }

    #[test]
    fn low_cores_or_memory_is_conserve_at_any_size() {
        let config = StarfieldConfig::default();
        let weak_cpu = DeviceHints { cores: Some(4), ..strong(false) };
        let weak_mem = DeviceHints { memory_gb: Some(2.0), ..strong(true) };
        for (w, h) in [(320.0, 480.0), (1920.0, 1080.0), (5120.0, 2880.0)] {
            assert_eq!(resolve_render_profile(&weak_cpu, &config, w, h).tier, Tier::Conserve);
            assert_eq!(resolve_render_profile(&weak_mem, &config, w, h).tier, Tier::Conserve);
        }
    }

    #[test]
    fn missing_hints_substitute_four_and_four() {
        let config = StarfieldConfig::default();
        // Defaults sit exactly on the conserve threshold
        let profile = resolve_render_profile(&DeviceHints::default(), &config, 1920.0, 1080.0);
        assert_eq!(profile.tier, Tier::Conserve);

        let only_cores = DeviceHints { cores: Some(16), ..DeviceHints::default() };
        assert_eq!(resolve_render_profile(&only_cores, &config, 1920.0, 1080.0).tier, Tier::Conserve);
    }

    #[test]
    fn small_touch_viewport_is_balanced() {
        let config = StarfieldConfig::default();
        let profile = resolve_render_profile(&strong(true), &config, 390.0, 844.0);
        assert_eq!(profile.tier, Tier::Balanced);
        assert_eq!(profile.target_fps, 45.0);
        assert_eq!(profile.max_pixel_ratio, 1.15);
    }

    #[test]
    fn small_viewport_without_touch_is_high() {
        let config = StarfieldConfig::default();
        let profile = resolve_render_profile(&strong(false), &config, 390.0, 844.0);
        assert_eq!(profile.tier, Tier::High);
    }

    #[test]
    fn large_touch_viewport_is_high() {
        let config = StarfieldConfig::default();
        let profile = resolve_render_profile(&strong(true), &config, 2560.0, 1440.0);
        assert_eq!(profile.tier, Tier::High);
        assert_eq!(profile.target_fps, 60.0);
        assert_eq!(profile.min_stars, 72);
    }

    #[test]
    fn resolution_is_deterministic() {
        let config = StarfieldConfig::default();
        let a = resolve_render_profile(&strong(true), &config, 800.0, 600.0);
        let b = resolve_render_profile(&strong(true), &config, 800.0, 600.0);
        assert_eq!(a, b);
    }

    #[test]
    fn pixel_ratio_is_capped_per_tier() {
        let config = StarfieldConfig::default();
        let high = resolve_render_profile(&strong(false), &config, 1920.0, 1080.0);
        assert_eq!(high.pixel_ratio(Some(3.0)), 1.35);
        assert_eq!(high.pixel_ratio(Some(1.0)), 1.0);
        assert_eq!(high.pixel_ratio(None), 1.0);
        assert_eq!(high.pixel_ratio(Some(0.0)), 1.0);

        let conserve = resolve_render_profile(&DeviceHints::default(), &config, 1920.0, 1080.0);
        assert_eq!(conserve.pixel_ratio(Some(2.0)), 1.0);
    }

    #[test]
    fn frame_interval_follows_target_fps() {
        let config = StarfieldConfig::default();
        let conserve = resolve_render_profile(&DeviceHints::default(), &config, 800.0, 600.0);
        assert!((conserve.frame_interval_ms() - 1000.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn nonsense_overrides_are_sanitized() {
        let mut config = StarfieldConfig::default();
        config.tiers.conserve.target_fps = 0.0;
        config.tiers.conserve.min_stars = 50;
        config.tiers.conserve.max_stars = 10;
        let profile = resolve_render_profile(&DeviceHints::default(), &config, 800.0, 600.0);
        assert!(profile.target_fps > 0.0);
        assert!(profile.min_stars <= profile.max_stars);
    }
}
