use std::collections::VecDeque;
use std::time::Duration;

/// Summary of the recent frame intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacing {
    pub frames: usize,
    pub mean: Duration,
    /// Standard deviation of the interval.
    pub jitter: Duration,
    pub shortest: Duration,
    pub longest: Duration,
}

impl FramePacing {
    pub fn fps(&self) -> f64 {
        let secs = self.mean.as_secs_f64();
        if secs > 0.0 { 1.0 / secs } else { 0.0 }
    }
}

/// Rolling window of presented-frame intervals.
#[derive(Debug, Clone)]
pub struct FrameWindow {
    intervals: VecDeque<Duration>,
    capacity: usize,
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl FrameWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            intervals: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, interval: Duration) {
        if self.intervals.len() == self.capacity {
            self.intervals.pop_front();
        }
        self.intervals.push_back(interval);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// `None` until at least one interval is recorded.
    pub fn pacing(&self) -> Option<FramePacing> {
        let shortest = *self.intervals.iter().min()?;
        let longest = *self.intervals.iter().max()?;
        let n = self.intervals.len() as u128;
        let mean_ns = self.intervals.iter().map(Duration::as_nanos).sum::<u128>() / n;
        let var = self
            .intervals
            .iter()
            .map(|d| (d.as_nanos() as f64 - mean_ns as f64).powi(2))
            .sum::<f64>()
            / n as f64;
        Some(FramePacing {
            frames: self.intervals.len(),
            mean: Duration::from_nanos(mean_ns as u64),
            jitter: Duration::from_nanos(var.sqrt().round() as u64),
            shortest,
            longest,
        })
    }
}
