// src/policy/classifier.rs
//
// Static-classifier decision policy. Wraps a pretrained binary model
// behind the MoistureModel seam; the model artifact is opaque input and
// no learning happens at runtime.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::{FarmId, PumpState};

use super::DecisionPolicy;

/// Pretrained binary classifier over a single smoothed-moisture scalar.
///
/// `true` means the model predicts the pump should run. Implementations are
/// expected to be deterministic for a given artifact and input.
pub trait MoistureModel: Send {
    fn predict(&self, moisture: f64) -> bool;
}

/// Linear decision function loaded from a JSON artifact.
///
/// Predicts "on" when `weight * moisture + bias > 0`. This is the shipped
/// concrete model; anything else satisfying `MoistureModel` plugs in the
/// same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weight: f64,
    pub bias: f64,
}

impl LinearModel {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening model artifact {}", path.display()))?;
        let model = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing model artifact {}", path.display()))?;
        Ok(model)
    }
}

impl MoistureModel for LinearModel {
    fn predict(&self, moisture: f64) -> bool {
        self.weight * moisture + self.bias > 0.0
    }
}

/// Decision policy that defers every recommendation to the wrapped model.
pub struct ClassifierPolicy {
    model: Box<dyn MoistureModel>,
}

impl ClassifierPolicy {
    pub fn new(model: Box<dyn MoistureModel>) -> Self {
        Self { model }
    }

    /// Build from a JSON artifact on disk.
    pub fn from_artifact(path: &Path) -> anyhow::Result<Self> {
        let model = LinearModel::load(path)?;
        Ok(Self::new(Box::new(model)))
    }
}

impl DecisionPolicy for ClassifierPolicy {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn recommend(&mut self, _farm: FarmId, smoothed: f64, _previous: PumpState) -> PumpState {
        if self.model.predict(smoothed) {
            PumpState::On
        } else {
            PumpState::Off
        }
    }
}
