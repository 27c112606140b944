// Animation
pub const LOOP_DURATION_MS: f64 = 90_000.0;
pub const ALPHA_FLOOR: f64 = 0.08;
pub const ALPHA_CEILING: f64 = 1.0;

// Global "breathing" envelope: BASE + DEPTH * sin(drift_cycle)
pub const ENVELOPE_BASE: f64 = 0.72;
pub const ENVELOPE_DEPTH: f64 = 0.28;

// Global pan amplitude in CSS px (x follows sin, y follows cos at 0.8x)
pub const PAN_X: f64 = 6.0;
pub const PAN_Y: f64 = 4.0;
pub const PAN_Y_RATE: f64 = 0.8;

// Per-star drift: y axis is flattened and phase-skewed relative to x
pub const DRIFT_Y_SCALE: f64 = 0.6;
pub const DRIFT_Y_PHASE_SKEW: f64 = 0.85;

// Rendering
pub const STAR_COLOR: &str = "#ffffff";
pub const EDGE_PADDING: f64 = 2.0;
pub const CIRCLE_MIN_SIZE: f64 = 1.3;

// Device hints substituted when the browser does not report them
pub const DEFAULT_CORES: u32 = 4;
pub const DEFAULT_MEMORY_GB: f64 = 4.0;
pub const DEFAULT_PIXEL_RATIO: f64 = 1.0;

// Dev FPS monitor
pub const FPS_SAMPLE_WINDOW_MS: f64 = 900.0;
