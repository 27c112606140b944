use std::f64::consts::TAU;

use crate::config::{LayerConfig, Span};
use crate::profile::RenderProfile;

/// Xorshift64 generator. Cheap enough to call per star and seedable so
/// generation can be replayed in tests.
#[derive(Debug, Clone)]
pub struct StarRng {
    state: u64,
}

impl StarRng {
    pub fn new(seed: u64) -> Self {
        Self { state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed } }
    }

    /// Seed once from the browser's `Math.random`
    pub fn from_entropy() -> Self {
        Self::new((js_sys::Math::random() * u64::MAX as f64) as u64)
    }

    /// Uniform in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn between(&mut self, (min, max): Span) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub base_alpha: f64,
    pub twinkle_speed: f64,
    pub twinkle_amplitude: f64,
    pub twinkle_phase: f64,
    pub drift_radius: f64,
    pub drift_phase: f64,
    pub layer: usize,
}

/// Built wholesale for one surface size; a resize replaces it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarPopulation {
    pub stars: Vec<Star>,
    pub layer_counts: Vec<usize>,
}

/// Total star count for a surface: density estimate nudged by the tier
/// scale, then clamped to the tier bounds.
pub fn target_population(width: f64, height: f64, profile: &RenderProfile) -> usize {
    let raw = (width * height * profile.density).round();
    let nudged = (raw * profile.population_scale).round();
    let nudged = if nudged.is_finite() && nudged > 0.0 { nudged as usize } else { 0 };
    nudged.clamp(profile.min_stars, profile.max_stars)
}

/// Split `total` across layers. Every layer but the last gets
/// `round(total * ratio)`; the last takes the remainder so the counts
/// always sum to `total`.
pub fn layer_counts(total: usize, layers: &[LayerConfig]) -> Vec<usize> {
    let mut counts = Vec::with_capacity(layers.len());
    let mut allocated = 0usize;
    for (index, layer) in layers.iter().enumerate() {
        let count = if index == layers.len() - 1 {
            total - allocated
        } else {
            ((total as f64 * layer.ratio).round().max(0.0) as usize).min(total - allocated)
        };
        allocated += count;
        counts.push(count);
    }
    counts
}

pub fn build_stars(
    width: f64,
    height: f64,
    profile: &RenderProfile,
    layers: &[LayerConfig],
    rng: &mut StarRng,
) -> StarPopulation {
    let total = target_population(width, height, profile);
    let counts = layer_counts(total, layers);
    let mut stars = Vec::with_capacity(total);

    for (layer_index, (layer, &count)) in layers.iter().zip(counts.iter()).enumerate() {
        for _ in 0..count {
            stars.push(Star {
                x: rng.next_f64() * width,
                y: rng.next_f64() * height,
                size: rng.between(layer.size),
                base_alpha: rng.between(layer.alpha),
                twinkle_speed: rng.between(layer.twinkle_speed),
                twinkle_amplitude: rng.between(layer.twinkle_amplitude),
                twinkle_phase: rng.next_f64() * TAU,
                drift_radius: rng.between(layer.drift),
                drift_phase: rng.next_f64() * TAU,
                layer: layer_index,
            });
        }
    }

    StarPopulation { stars, layer_counts: counts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StarfieldConfig;
    use crate::profile::{resolve_render_profile, DeviceHints, Tier};

    fn profile(tier: Tier) -> RenderProfile {
        let config = StarfieldConfig::default();
        let hints = match tier {
            Tier::Conserve => DeviceHints::default(),
            Tier::Balanced => DeviceHints { cores: Some(8), memory_gb: Some(8.0), touch: true, pixel_ratio: None },
            Tier::High => DeviceHints { cores: Some(8), memory_gb: Some(8.0), touch: false, pixel_ratio: None },
        };
        let p = resolve_render_profile(&hints, &config, 400.0, 400.0);
        assert_eq!(p.tier, tier);
        p
    }

    #[test]
    fn rng_stays_in_unit_interval() {
        let mut rng = StarRng::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn zero_seed_does_not_stick() {
        let mut rng = StarRng::new(0);
        let a = rng.next_f64();
        let b = rng.next_f64();
        assert_ne!(a, b);
    }

    #[test]
    fn population_stays_within_bounds() {
        for tier in [Tier::Conserve, Tier::Balanced, Tier::High] {
            let p = profile(tier);
            for (w, h) in [(1.0, 1.0), (320.0, 568.0), (800.0, 600.0), (1920.0, 1080.0), (7680.0, 4320.0)] {
                let total = target_population(w, h, &p);
                assert!(total >= p.min_stars && total <= p.max_stars, "{tier:?} {w}x{h} -> {total}");
            }
        }
    }

    #[test]
    fn layer_counts_sum_exactly_under_rounding() {
        let layers = StarfieldConfig::default().layers;
        // 0.5 * 101 = 50.5 and 0.33 * 101 = 33.33 both round
        let counts = layer_counts(101, &layers);
        assert_eq!(counts, vec![51, 33, 17]);
        assert_eq!(counts.iter().sum::<usize>(), 101);

        for total in 0..500 {
            assert_eq!(layer_counts(total, &layers).iter().sum::<usize>(), total);
        }
    }

    #[test]
    fn oversized_ratios_never_underflow() {
        let mut layers = StarfieldConfig::default().layers;
        layers[0].ratio = 0.8;
        layers[1].ratio = 0.8;
        let counts = layer_counts(10, &layers);
        assert_eq!(counts, vec![8, 2, 0]);
    }

    #[test]
    fn small_high_tier_surface_clamps_to_minimum() {
        let p = profile(Tier::High);
        let layers = StarfieldConfig::default().layers;
        let mut rng = StarRng::new(7);
        let population = build_stars(800.0, 600.0, &p, &layers, &mut rng);

        assert_eq!((800.0_f64 * 600.0 * p.density).round(), 24.0);
        assert_eq!(population.stars.len(), 72);
        assert_eq!(population.layer_counts, vec![36, 24, 12]);
    }

    #[test]
    fn tier_scale_nudges_unclamped_totals() {
        let high = profile(Tier::High);
        // 2000 * 2000 * 0.00005 = 200, * 1.04 = 208
        assert_eq!(target_population(2000.0, 2000.0, &high), 208);
        let conserve = profile(Tier::Conserve);
        // 2000 * 2000 * 0.000035 = 140, * 0.95 = 133
        assert_eq!(target_population(2000.0, 2000.0, &conserve), 133);
    }

    #[test]
    fn stars_sample_inside_their_layer_ranges() {
        let p = profile(Tier::High);
        let layers = StarfieldConfig::default().layers;
        let mut rng = StarRng::new(99);
        let population = build_stars(1920.0, 1080.0, &p, &layers, &mut rng);

        for star in &population.stars {
            let layer = &layers[star.layer];
            assert!(star.x >= 0.0 && star.x < 1920.0);
            assert!(star.y >= 0.0 && star.y < 1080.0);
            assert!(star.size >= layer.size.0 && star.size <= layer.size.1);
            assert!(star.base_alpha >= layer.alpha.0 && star.base_alpha <= layer.alpha.1);
            assert!(star.drift_radius >= layer.drift.0 && star.drift_radius <= layer.drift.1);
            assert!(star.twinkle_phase >= 0.0 && star.twinkle_phase < TAU);
        }
    }

    #[test]
    fn stars_are_ordered_by_layer() {
        let p = profile(Tier::Balanced);
        let layers = StarfieldConfig::default().layers;
        let mut rng = StarRng::new(3);
        let population = build_stars(1024.0, 768.0, &p, &layers, &mut rng);
        assert!(population.stars.windows(2).all(|w| w[0].layer <= w[1].layer));
        for (layer, &count) in population.layer_counts.iter().enumerate() {
            assert_eq!(population.stars.iter().filter(|s| s.layer == layer).count(), count);
        }
    }

    #[test]
    fn same_seed_builds_same_field() {
        let p = profile(Tier::High);
        let layers = StarfieldConfig::default().layers;
        let a = build_stars(640.0, 480.0, &p, &layers, &mut StarRng::new(5));
        let b = build_stars(640.0, 480.0, &p, &layers, &mut StarRng::new(5));
        assert_eq!(a, b);
    }
}
