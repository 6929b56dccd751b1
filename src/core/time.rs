//! Frame timing for brush strokes

use std::time::{Duration, Instant};

/// Largest delta a single brush tick may apply (100Hz baseline).
pub const MAX_BRUSH_DELTA: f32 = 0.01;

/// Clamp a frame delta to `[0, MAX_BRUSH_DELTA]`.
///
/// Keeps brush strength frame-rate independent without letting a stalled
/// host accumulate one huge step.
pub fn clamp_delta(delta_secs: f32) -> f32 {
    if delta_secs.is_nan() {
        return 0.0;
    }
    delta_secs.clamp(0.0, MAX_BRUSH_DELTA)
}

/// Tracks wall-clock time between brush ticks
pub struct BrushClock {
    last_tick: Instant,
    delta: Duration,
    tick_count: u64,
}

impl BrushClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            delta: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Call once per host frame. Returns the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.tick_count += 1;
        self.delta_secs()
    }

    /// Clamped delta of the last tick in seconds
    pub fn delta_secs(&self) -> f32 {
        clamp_delta(self.delta.as_secs_f32())
    }

    /// Unclamped delta of the last tick
    pub fn raw_delta(&self) -> Duration {
        self.delta
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for BrushClock {
    fn default() -> Self {
        Self::new()
    }
}
