//! Simulation clock
//!
//! Millisecond time that only moves when the session advances a frame, so a
//! finished game freezes every timer and countdown.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationClock {
    now_ms: u64,
    frames: u64,
    /// Start of the current run (reset on restart)
    run_start_ms: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `dt_ms`
    pub fn advance(&mut self, dt_ms: u64) {
        self.now_ms += dt_ms;
        self.frames += 1;
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Frames advanced since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Mark the current instant as the start of a run
    pub fn restart_run(&mut self) {
        self.run_start_ms = self.now_ms;
    }

    pub fn run_elapsed_ms(&self) -> u64 {
        self.now_ms - self.run_start_ms
    }

    /// Whole seconds survived in the current run
    pub fn run_elapsed_secs(&self) -> u64 {
        self.run_elapsed_ms() / 1000
    }

    /// Milliseconds left until `duration_ms` has passed since `since`.
    /// `None` means "never started", which counts as elapsed.
    pub fn remaining(&self, since: Option<u64>, duration_ms: u64) -> u64 {
        match since {
            Some(start) => duration_ms.saturating_sub(self.now_ms.saturating_sub(start)),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_run_elapsed() {
        let mut clock = SimulationClock::new();
        for _ in 0..100 {
            clock.advance(16);
        }
        assert_eq!(clock.now(), 1600);
        assert_eq!(clock.frames(), 100);
        assert_eq!(clock.run_elapsed_secs(), 1);

        clock.restart_run();
        assert_eq!(clock.run_elapsed_ms(), 0);
        clock.advance(2500);
        assert_eq!(clock.run_elapsed_secs(), 2);
    }

    #[test]
    fn test_remaining_countdown() {
        let mut clock = SimulationClock::new();
        assert_eq!(clock.remaining(None, 40_000), 0);
        clock.advance(1000);
        let started = Some(clock.now());
        clock.advance(39_999);
        assert_eq!(clock.remaining(started, 40_000), 1);
        clock.advance(1);
        assert_eq!(clock.remaining(started, 40_000), 0);
        clock.advance(5000);
        assert_eq!(clock.remaining(started, 40_000), 0);
    }
}
