// src/policy/bangbang.rs
//
// External two-state (relay) controller variant. The controller primitive
// mirrors the usual bang-bang contract: energize fully while the
// measurement sits below the setpoint, de-energize otherwise.

use crate::types::{FarmId, PumpState};

use super::DecisionPolicy;

/// Two-state relay controller.
///
/// `calculate` returns whether the actuator should energize and records the
/// current error (setpoint - measurement) for inspection.
#[derive(Debug, Clone, Default)]
pub struct BangBangController {
    last_error: f64,
}

impl BangBangController {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while `measurement < setpoint`.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64) -> bool {
        self.last_error = setpoint - measurement;
        measurement < setpoint
    }

    /// Error from the most recent `calculate` call.
    pub fn error(&self) -> f64 {
        self.last_error
    }
}

/// Decision policy delegating to one relay controller per farm, with the
/// upper moisture threshold as the shared setpoint.
pub struct BangBangPolicy {
    controllers: [BangBangController; 2],
    setpoint: f64,
}

impl BangBangPolicy {
    pub fn new(setpoint: f64) -> Self {
        Self {
            controllers: [BangBangController::new(), BangBangController::new()],
            setpoint,
        }
    }

    pub fn controller(&self, farm: FarmId) -> &BangBangController {
        &self.controllers[farm.index()]
    }
}

impl DecisionPolicy for BangBangPolicy {
    fn name(&self) -> &'static str {
        "bangbang"
    }

    fn recommend(&mut self, farm: FarmId, smoothed: f64, _previous: PumpState) -> PumpState {
        if self.controllers[farm.index()].calculate(smoothed, self.setpoint) {
            PumpState::On
        } else {
            PumpState::Off
        }
    }
}
