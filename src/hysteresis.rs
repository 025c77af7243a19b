// src/hysteresis.rs
//
// Two-state deadband gate per farm. The gate only decides *eligibility*;
// the final pump state is the AND of this signal with the installed
// decision policy's recommendation.

use crate::config::HysteresisConfig;
use crate::types::PumpState;

/// Deadband eligibility gate.
///
/// With previous state Off, the pump becomes eligible only once the smoothed
/// moisture drops below `lower_threshold - buffer_zone`. With previous state
/// On, it stays eligible while the smoothed moisture remains below
/// `upper_threshold + buffer_zone`. Inside the deadband a settled state
/// holds, which is what prevents rapid toggling around either threshold.
#[derive(Debug, Clone)]
pub struct HysteresisGate {
    cfg: HysteresisConfig,
}

impl HysteresisGate {
    pub fn new(cfg: &HysteresisConfig) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Whether the pump is eligible to be (or remain) on this tick.
    pub fn eligible(&self, previous: PumpState, smoothed: f64) -> bool {
        match previous {
            PumpState::Off => smoothed < self.cfg.on_below(),
            PumpState::On => smoothed < self.cfg.off_at(),
        }
    }

    /// The state the gate alone would settle on this tick.
    pub fn candidate(&self, previous: PumpState, smoothed: f64) -> PumpState {
        if self.eligible(previous, smoothed) {
            PumpState::On
        } else {
            PumpState::Off
        }
    }
}
