use std::thread;
use std::time::{Duration, Instant};

/// Real-time pacing for the CPU tick counter (`spec.md` §4.2).
///
/// Compares `ticks * period_ns` (where the CPU "should" be) against wall
/// clock elapsed time, sleeping the difference when the CPU has run ahead.
/// A negative `period_ns` disables pacing entirely ("run as fast as
/// possible").
pub struct CpuClock {
    period_ns: i64,
    sampling_period_ns: u64,
    started_at: Instant,
    next_sample_at: u64,
}

impl CpuClock {
    pub fn new(period_ns: i64, sampling_freq_hz: f64) -> Self {
        let sampling_period_ns = if sampling_freq_hz > 0.0 {
            (1_000_000_000.0 / sampling_freq_hz) as u64
        } else {
            16_666_667
        };
        Self {
            period_ns,
            sampling_period_ns,
            started_at: Instant::now(),
            next_sample_at: 0,
        }
    }

    /// Restart pacing from "now" with a zero tick count, as `Machine` does
    /// at the top of every `run()`.
    pub fn reset(&mut self) {
        self.started_at = Instant::now();
        self.next_sample_at = 0;
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.started_at.elapsed().as_nanos() as u64
    }

    /// Called once per loop iteration with the cumulative tick count.
    /// Samples at most once per `sampling_period_ns` of real time; sleeps
    /// if the CPU is more than one sample ahead of schedule, logs a warning
    /// if it has fallen behind by more than one sample.
    pub fn pace(&mut self, ticks: u64) {
        if self.period_ns < 0 {
            return;
        }

        let elapsed = self.elapsed_ns();
        if elapsed < self.next_sample_at {
            return;
        }
        self.next_sample_at = elapsed + self.sampling_period_ns;

        let target_ns = ticks.saturating_mul(self.period_ns as u64);
        if target_ns > elapsed {
            thread::sleep(Duration::from_nanos(target_ns - elapsed));
        } else {
            let lag = elapsed - target_ns;
            if lag > self.sampling_period_ns {
                log::warn!("cpu clock behind real time by {lag} ns");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_period_never_sleeps() {
        let mut clock = CpuClock::new(-1, 60.0);
        let before = Instant::now();
        clock.pace(1_000_000_000);
        assert!(before.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn zero_ticks_does_not_panic() {
        let mut clock = CpuClock::new(1000, 60.0);
        clock.pace(0);
    }
}
