use crate::constants::FPS_SAMPLE_WINDOW_MS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsSnapshot {
    pub fps: u32,
    pub frame_ms: f64,
}

/// Dev-only frame-rate sampler fed from drawn ticks
#[derive(Debug, Default)]
pub struct FpsMonitor {
    frame_count: u32,
    sample_start: Option<f64>,
}

impl FpsMonitor {
    pub fn reset(&mut self) {
        self.frame_count = 0;
        self.sample_start = None;
    }

    /// Count a frame drawn at `now`; yields a snapshot once per sample window
    pub fn record(&mut self, now: f64) -> Option<FpsSnapshot> {
        let start = match self.sample_start {
            Some(start) => start,
            None => {
                self.sample_start = Some(now);
                return None;
            }
        };

        self.frame_count += 1;
        let elapsed = now - start;
        if elapsed < FPS_SAMPLE_WINDOW_MS {
            return None;
        }

        let frames = self.frame_count as f64;
        let snapshot = FpsSnapshot {
            fps: (frames * 1000.0 / elapsed).round() as u32,
            frame_ms: (elapsed / frames * 10.0).round() / 10.0,
        };
        self.frame_count = 0;
        self.sample_start = Some(now);
        Some(snapshot)
    }
}
