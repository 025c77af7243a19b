// src/state.rs
//
// Mutable per-farm state owned by the control loop, plus the loop's
// lifecycle phase.

use crate::buffer::SensorBuffer;
use crate::config::Config;
use crate::metrics::{DutyCycleTracker, MoistureStats};
use crate::types::{FarmId, PumpState};

/// Everything one farm carries across ticks.
///
/// The pump state persists between cycles: it is the "previous state" that
/// feeds both the hysteresis gate and the Q-learning state lookup.
#[derive(Debug, Clone)]
pub struct FarmState {
    pub id: FarmId,
    /// Smoothing buffer for this farm's raw moisture readings.
    pub buffer: SensorBuffer,
    /// Final pump state from the previous cycle (initially Off).
    pub pump: PumpState,
    /// Running stats over the smoothed readings, for the run summary.
    pub moisture_stats: MoistureStats,
    /// Running pump duty cycle, for the run summary.
    pub duty: DutyCycleTracker,
}

impl FarmState {
    pub fn new(id: FarmId, cfg: &Config) -> Self {
        Self {
            id,
            buffer: SensorBuffer::new(cfg.smoothing.window),
            pump: PumpState::Off,
            moisture_stats: MoistureStats::default(),
            duty: DutyCycleTracker::default(),
        }
    }
}

/// Lifecycle phase of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Waiting for the startup telemetry line.
    AwaitingInput,
    /// Ticking.
    Running,
    /// Terminal: cancellation processed, learned state persisted.
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_state_starts_off_and_empty() {
        let cfg = Config::default();
        let farm = FarmState::new(FarmId::Farm1, &cfg);

        assert_eq!(farm.pump, PumpState::Off);
        assert!(farm.buffer.is_empty());
        assert_eq!(farm.buffer.capacity(), cfg.smoothing.window);
        assert_eq!(farm.duty.ticks(), 0);
    }
}
