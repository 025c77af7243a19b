// src/engine.rs
//
// Per-farm per-tick decision step:
//  - push the raw reading through the smoothing buffer,
//  - ask the hysteresis gate for eligibility,
//  - ask the installed policy for a recommendation,
//  - combine (gate AND policy) into the final pump state,
//  - feed the realized action back through the policy's learn hook.

use crate::config::Config;
use crate::hysteresis::HysteresisGate;
use crate::policy::DecisionPolicy;
use crate::state::FarmState;
use crate::types::{FarmId, PumpState};

/// Outcome of one farm's tick.
#[derive(Debug, Clone, Copy)]
pub struct FarmTick {
    pub farm: FarmId,
    /// Moving-average moisture the decision was made on.
    pub smoothed: f64,
    /// Gate eligibility for this tick.
    pub eligible: bool,
    /// Raw policy recommendation before gating.
    pub recommendation: PumpState,
    /// Final pump state (eligible AND recommendation).
    pub pump: PumpState,
}

pub struct Engine {
    gate: HysteresisGate,
}

impl Engine {
    pub fn new(cfg: &Config) -> Self {
        Self {
            gate: HysteresisGate::new(&cfg.hysteresis),
        }
    }

    /// Run one cycle for one farm.
    ///
    /// The policy only gets the learn callback after the final state is
    /// known, so learning always sees the action that actually ran.
    pub fn farm_tick(
        &self,
        farm: &mut FarmState,
        policy: &mut dyn DecisionPolicy,
        raw_moisture: f64,
    ) -> FarmTick {
        farm.buffer.add_reading(raw_moisture);
        let smoothed = farm.buffer.average();
        let previous = farm.pump;

        let eligible = self.gate.eligible(previous, smoothed);
        let recommendation = policy.recommend(farm.id, smoothed, previous);

        let pump = if eligible && recommendation.is_on() {
            PumpState::On
        } else {
            PumpState::Off
        };

        policy.learn(farm.id, smoothed, previous, pump);

        farm.pump = pump;
        farm.moisture_stats.add(smoothed);
        farm.duty.record(pump);

        FarmTick {
            farm: farm.id,
            smoothed,
            eligible,
            recommendation,
            pump,
        }
    }
}
