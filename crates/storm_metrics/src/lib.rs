//! Storm Metrics - frame timing and throughput tracking
//!
//! [`FrameClock`] is always available: the frame loop needs its delta time
//! and the overlay needs its FPS. Phase profiling is opt-in and compiles to
//! no-op stubs without the feature flag.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable phase profiling (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use storm_metrics::{FrameClock, PhaseProfiler, time_scope};
//!
//! let mut clock = FrameClock::new(60); // Smooth over the last 60 frames
//! let mut profiler = PhaseProfiler::new();
//! let dt = clock.tick();
//! time_scope!(profiler, "update", { population.update(dt) });
//! profiler.end_frame();
//! println!("FPS: {:.1}", clock.fps());
//! ```

mod frame_clock;
mod ring_buffer;
#[cfg(feature = "metrics")]
mod phase_profiler;

pub use frame_clock::{FrameClock, DEFAULT_FPS_WINDOW};
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;

/// Time a block as the named phase. Evaluates to the block's value.
#[macro_export]
macro_rules! time_scope {
    ($profiler:expr, $name:expr, $body:block) => {
        $profiler.time_phase($name, || $body)
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new() -> Self { Self }
    #[inline(always)]
    pub fn time_phase<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn end_frame(&mut self) {}
    pub fn get_timing(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn average_ms(&self, _name: &str) -> f64 { 0.0 }
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, std::time::Duration)> + '_ {
        std::iter::empty()
    }
}
