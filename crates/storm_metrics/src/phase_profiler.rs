//! Per-frame timing of named loop phases (update, draw, present)

use std::time::{Duration, Instant};

pub struct PhaseProfiler {
    phases: Vec<(&'static str, Duration)>,
    frames: u32,
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            frames: 0,
        }
    }

    pub fn time_phase<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        match self.phases.iter_mut().find(|(phase, _)| *phase == name) {
            Some((_, total)) => *total += elapsed,
            None => self.phases.push((name, elapsed)),
        }
        result
    }

    pub fn end_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    pub fn get_timing(&self, name: &str) -> Duration {
        self.phases
            .iter()
            .find(|(phase, _)| *phase == name)
            .map(|(_, total)| *total)
            .unwrap_or(Duration::ZERO)
    }

    /// Mean milliseconds per frame spent in `name`.
    pub fn average_ms(&self, name: &str) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.get_timing(name).as_secs_f64() * 1000.0 / f64::from(self.frames)
    }

    pub fn reset(&mut self) {
        self.phases.clear();
        self.frames = 0;
    }

    /// Phases in first-timed order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.phases.iter().copied()
    }
}

impl Default for PhaseProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_accumulate_in_order() {
        let mut profiler = PhaseProfiler::new();

        let value = profiler.time_phase("update", || 7);
        profiler.time_phase("draw", || ());
        profiler.time_phase("update", || ());
        profiler.end_frame();

        assert_eq!(value, 7);
        let names: Vec<_> = profiler.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["update", "draw"]);
        assert!(profiler.average_ms("update") >= 0.0);
        assert_eq!(profiler.get_timing("missing"), Duration::ZERO);
    }

    #[test]
    fn test_average_without_frames_is_zero() {
        let mut profiler = PhaseProfiler::new();
        profiler.time_phase("update", || std::thread::sleep(Duration::from_millis(1)));
        assert_eq!(profiler.average_ms("update"), 0.0);

        profiler.reset();
        assert_eq!(profiler.iter().count(), 0);
    }
}
