//! Self-contained timers driven by frame deltas.

/// Throttled timer - minimum interval between fires
#[derive(Debug, Clone, Copy)]
pub struct Throttled {
    min_interval: f32,
    time_since_last: f32,
}

impl Throttled {
    pub fn new(min_interval: f32) -> Self {
        Self {
            min_interval,
            // first call fires immediately
            time_since_last: min_interval,
        }
    }

    /// Returns true if at least `min_interval` seconds passed since the last fire
    pub fn try_tick(&mut self, delta: f32) -> bool {
        self.time_since_last += delta;

        if self.time_since_last >= self.min_interval {
            self.time_since_last = 0.0;
            true
        } else {
            false
        }
    }
}

/// Averages frame rate over a reporting window
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    window: f32,
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    pub fn new(window_seconds: f32) -> Self {
        Self {
            window: window_seconds,
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Count one frame; yields the average once per window
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;
        if self.elapsed < self.window || self.elapsed <= 0.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}
