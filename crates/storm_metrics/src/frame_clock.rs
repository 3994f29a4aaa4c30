//! Frame clock: per-frame delta time and a smoothed FPS readout

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

/// Number of frames averaged for the FPS readout when no window is given.
pub const DEFAULT_FPS_WINDOW: usize = 60;

/// Measures wall time between frames.
///
/// The first tick after construction (or [`FrameClock::reset`]) only records
/// the timestamp and reports a zero delta, so the simulation never sees the
/// time spent on startup as one giant frame.
pub struct FrameClock {
    last_tick: Option<Instant>,
    frame_times: RingBuffer<Duration>,
    fps: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new(window: usize) -> Self {
        Self {
            last_tick: None,
            frame_times: RingBuffer::new(window),
            fps: 0.0,
            frames: 0,
        }
    }

    /// Advance the clock to now and return the elapsed seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance the clock to `now` and return the elapsed seconds.
    ///
    /// A `now` earlier than the previous tick yields zero.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let Some(last) = self.last_tick.replace(now) else {
            return 0.0;
        };

        let elapsed = now.saturating_duration_since(last);
        self.frame_times.push(elapsed);
        self.frames += 1;

        // Zero-length frames keep the previous reading.
        let avg = self.frame_times.average().as_secs_f64();
        if avg > 0.0 {
            self.fps = 1.0 / avg;
        }

        elapsed.as_secs_f32()
    }

    /// Smoothed frames per second. Always finite; 0.0 until a non-zero frame
    /// has been measured.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Frames measured since the first tick.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.frame_times.average().as_secs_f64() * 1000.0
    }

    pub fn frame_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.frame_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }

    pub fn reset(&mut self) {
        self.last_tick = None;
        self.frame_times.clear();
        self.fps = 0.0;
        self.frames = 0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_FPS_WINDOW)
    }
}
