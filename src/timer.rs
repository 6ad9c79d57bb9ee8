//! Timer providers

use std::time::Duration;

use crate::provider::TimerProvider;

/// Sleeps the calling thread for whole ticks of a fixed length
#[derive(Debug, Clone, Copy)]
pub struct SleepTimer {
    tick: Duration,
}

impl SleepTimer {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Wall-clock duration of `ticks` ticks
    pub fn duration_of(&self, ticks: u32) -> Duration {
        self.tick.saturating_mul(ticks)
    }
}

impl TimerProvider for SleepTimer {
    fn wait(&mut self, ticks: u32) {
        if ticks == 0 {
            return;
        }
        let duration = self.duration_of(ticks);
        tracing::debug!("waiting {} ticks ({:?})", ticks, duration);
        std::thread::sleep(duration);
    }
}

/// Records requested waits without sleeping
#[derive(Debug, Default)]
pub struct ManualTimer {
    waits: Vec<u32>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tick count passed to `wait`, in call order
    pub fn waits(&self) -> &[u32] {
        &self.waits
    }

    pub fn total_ticks(&self) -> u64 {
        self.waits.iter().map(|&t| u64::from(t)).sum()
    }
}

impl TimerProvider for ManualTimer {
    fn wait(&mut self, ticks: u32) {
        self.waits.push(ticks);
    }
}
