// src/config.rs
//
// Central configuration for the acequia control loop.
// This is the single source of truth for the smoothing window, the
// hysteresis thresholds, the Q-learning hyperparameters and the loop
// cadence. The binary applies CLI / env overrides on top of the defaults.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Human-readable config / release version.
    pub version: &'static str,
    /// Sensor smoothing (moving-average) config, shared by both farms.
    pub smoothing: SmoothingConfig,
    /// Hysteresis deadband config, shared by both farms.
    pub hysteresis: HysteresisConfig,
    /// Tabular Q-learning hyperparameters (only used by that policy).
    pub qlearning: QLearningConfig,
    /// Control-loop cadence.
    pub run: RunConfig,
}

#[derive(Debug, Clone)]
pub struct SmoothingConfig {
    /// Number of most-recent readings averaged per farm.
    pub window: usize,
}

/// Per-run deadband constants.
///
/// The gate turns a pump eligible below `lower_threshold - buffer_zone`
/// and forces it off at `upper_threshold + buffer_zone`. The margin keeps
/// the pump from toggling rapidly around a single setpoint.
#[derive(Debug, Clone)]
pub struct HysteresisConfig {
    /// Moisture percentage below which irrigation becomes eligible.
    pub lower_threshold: f64,
    /// Moisture percentage above which irrigation must stop.
    pub upper_threshold: f64,
    /// Deadband margin applied on both sides.
    pub buffer_zone: f64,
}

impl HysteresisConfig {
    /// Bound below which an Off pump becomes eligible to turn on.
    pub fn on_below(&self) -> f64 {
        self.lower_threshold - self.buffer_zone
    }

    /// Bound at or above which an On pump must turn off.
    pub fn off_at(&self) -> f64 {
        self.upper_threshold + self.buffer_zone
    }
}

#[derive(Debug, Clone)]
pub struct QLearningConfig {
    /// TD learning rate α.
    pub learning_rate: f64,
    /// Discount factor γ.
    pub discount_factor: f64,
    /// Seed for the dataset balance / shuffle at table creation.
    pub shuffle_seed: u64,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Fixed sleep between ticks.
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "acequia-0.1.0",
            smoothing: SmoothingConfig { window: 5 },
            hysteresis: HysteresisConfig {
                lower_threshold: 30.0,
                upper_threshold: 90.0,
                buffer_zone: 2.0,
            },
            qlearning: QLearningConfig {
                learning_rate: 0.1,
                discount_factor: 0.95,
                shuffle_seed: 42,
            },
            run: RunConfig {
                tick_interval: Duration::from_secs(10),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constants() {
        let cfg = Config::default();

        assert_eq!(cfg.smoothing.window, 5);
        assert_eq!(cfg.hysteresis.lower_threshold, 30.0);
        assert_eq!(cfg.hysteresis.upper_threshold, 90.0);
        assert_eq!(cfg.hysteresis.buffer_zone, 2.0);
        assert_eq!(cfg.qlearning.learning_rate, 0.1);
        assert_eq!(cfg.qlearning.discount_factor, 0.95);
        assert_eq!(cfg.run.tick_interval, Duration::from_secs(10));
    }

    #[test]
    fn deadband_bounds() {
        let cfg = Config::default();

        assert_eq!(cfg.hysteresis.on_below(), 28.0);
        assert_eq!(cfg.hysteresis.off_at(), 92.0);
    }
}
