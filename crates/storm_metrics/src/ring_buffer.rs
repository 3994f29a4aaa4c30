//! Fixed-size sample window
//!
//! Keeps the newest `capacity` samples; pushing into a full window evicts
//! the oldest.

use std::collections::VecDeque;
use std::time::Duration;

pub struct RingBuffer<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a sample, returning the one it pushed out (if the window was full).
    pub fn push(&mut self, sample: T) -> Option<T> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.samples.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl RingBuffer<Duration> {
    /// Mean of the window, zero when empty.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.samples.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.samples.iter().sum::<Duration>() / n,
        }
    }

    /// Shortest and longest sample, both zero when empty.
    pub fn min_max(&self) -> (Duration, Duration) {
        self.samples
            .iter()
            .fold(None, |acc: Option<(Duration, Duration)>, &d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
            .unwrap_or((Duration::ZERO, Duration::ZERO))
    }
}
