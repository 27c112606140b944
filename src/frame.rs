use std::f64::consts::TAU;

use crate::constants::*;
use crate::stars::Star;

/// Minimal 2d drawing surface the starfield paints onto
pub trait Surface {
    fn clear(&self, width: f64, height: f64);
    fn set_fill(&self, color: &str);
    fn set_alpha(&self, alpha: f64);
    /// Axis-aligned square centred on `(x, y)`
    fn fill_square(&self, x: f64, y: f64, half_side: f64);
    fn fill_circle(&self, x: f64, y: f64, radius: f64);
}

/// Toroidal wrap into `[0, max)`
pub fn wrap(value: f64, max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs
    if wrapped >= max { 0.0 } else { wrapped }
}

/// Phase of the 90 s loop in radians, `[0, 2π)`
pub fn drift_cycle(elapsed_ms: f64) -> f64 {
    let progress = elapsed_ms.rem_euclid(LOOP_DURATION_MS) / LOOP_DURATION_MS;
    progress * TAU
}

pub fn cycle_envelope(cycle: f64) -> f64 {
    ENVELOPE_BASE + ENVELOPE_DEPTH * cycle.sin()
}

/// Slow whole-field pan shared by every star
pub fn global_offset(cycle: f64) -> (f64, f64) {
    (cycle.sin() * PAN_X, (PAN_Y_RATE * cycle).cos() * PAN_Y)
}

/// Loop-wide values computed once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub elapsed_seconds: f64,
    pub cycle: f64,
    pub envelope: f64,
    pub offset: (f64, f64),
}

impl FrameState {
    pub fn at(elapsed_ms: f64) -> Self {
        let cycle = drift_cycle(elapsed_ms);
        Self {
            elapsed_seconds: elapsed_ms / 1000.0,
            cycle,
            envelope: cycle_envelope(cycle),
            offset: global_offset(cycle),
        }
    }
}

pub fn star_alpha(star: &Star, frame: &FrameState) -> f64 {
    let twinkle = (frame.elapsed_seconds * star.twinkle_speed + star.twinkle_phase).sin() * star.twinkle_amplitude;
    let resting = (star.base_alpha + twinkle).clamp(ALPHA_FLOOR, ALPHA_CEILING);
    (resting * frame.envelope).clamp(ALPHA_FLOOR, ALPHA_CEILING)
}

pub fn star_position(star: &Star, frame: &FrameState, width: f64, height: f64) -> (f64, f64) {
    let drift_x = (frame.cycle + star.drift_phase).cos() * star.drift_radius;
    let drift_y = (frame.cycle + star.drift_phase * DRIFT_Y_PHASE_SKEW).sin() * star.drift_radius * DRIFT_Y_SCALE;
    (
        wrap(star.x + drift_x + frame.offset.0, width),
        wrap(star.y + drift_y + frame.offset.1, height),
    )
}

/// Call `draw` for the star's position and for each mirror across an edge it
/// is close enough to clip against, so wrapping never pops.
pub fn for_each_copy(x: f64, y: f64, pad: f64, width: f64, height: f64, mut draw: impl FnMut(f64, f64)) {
    draw(x, y);

    let mirror_x = if x < pad {
        Some(x + width)
    } else if x > width - pad {
        Some(x - width)
    } else {
        None
    };
    let mirror_y = if y < pad {
        Some(y + height)
    } else if y > height - pad {
        Some(y - height)
    } else {
        None
    };

    if let Some(mx) = mirror_x {
        draw(mx, y);
    }
    if let Some(my) = mirror_y {
        draw(x, my);
    }
    if let (Some(mx), Some(my)) = (mirror_x, mirror_y) {
        draw(mx, my);
    }
}

/// Time base and skip-frame throttle carried between ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    start_time: Option<f64>,
    last_frame_time: Option<f64>,
}

impl FrameClock {
    pub fn reset(&mut self) {
        self.start_time = None;
        self.last_frame_time = None;
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn last_frame_time(&self) -> Option<f64> {
        self.last_frame_time
    }

    /// Returns the elapsed ms to draw at, or `None` when the tick arrives
    /// sooner than `interval_ms` after the last drawn one.
    pub fn advance(&mut self, timestamp: f64, interval_ms: f64) -> Option<f64> {
        let start = *self.start_time.get_or_insert(timestamp);

        if let Some(last) = self.last_frame_time {
            if timestamp - last < interval_ms {
                return None;
            }
        }

        self.last_frame_time = Some(timestamp);
        Some(timestamp - start)
    }
}

pub fn draw_frame(surface: &impl Surface, stars: &[Star], elapsed_ms: f64, width: f64, height: f64) {
    let frame = FrameState::at(elapsed_ms);

    surface.clear(width, height);
    surface.set_fill(STAR_COLOR);

    for star in stars {
        let (x, y) = star_position(star, &frame, width, height);
        surface.set_alpha(star_alpha(star, &frame));

        let size = star.size;
        let circle = size > CIRCLE_MIN_SIZE;
        for_each_copy(x, y, size + EDGE_PADDING, width, height, |px, py| {
            if circle {
                surface.fill_circle(px, py, size);
            } else {
                surface.fill_square(px, py, size);
            }
        });
    }

    surface.set_alpha(1.0);
}
