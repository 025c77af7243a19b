// src/policy/mod.rs
//
// Decision-policy abstraction for the control loop.
//
// Three swappable implementations share one interface:
// - ClassifierPolicy: pretrained static binary classifier
// - QLearningPolicy:  online tabular Q-learning, updated every cycle
// - BangBangPolicy:   external two-state (relay) controller
//
// The orchestrator is agnostic to which is installed: it asks for a
// recommendation, combines it with the hysteresis gate, then hands the
// realized action back through `learn`. Policies without internal learning
// leave the default hooks untouched.

pub mod bangbang;
pub mod classifier;
pub mod qlearning;

pub use bangbang::{BangBangController, BangBangPolicy};
pub use classifier::{ClassifierPolicy, LinearModel, MoistureModel};
pub use qlearning::{moisture_bucket, reward, QLearningPolicy, QTable};

use crate::types::{FarmId, PumpState};

/// Interface for all pump decision policies.
pub trait DecisionPolicy: Send {
    /// Short stable name for logs and summaries.
    fn name(&self) -> &'static str;

    /// Candidate recommendation for one farm given the smoothed moisture
    /// and the farm's previous pump state.
    fn recommend(&mut self, farm: FarmId, smoothed: f64, previous: PumpState) -> PumpState;

    /// Feedback hook, called once per farm per cycle after the final
    /// (gated) pump state is known. Default: no learning.
    fn learn(&mut self, farm: FarmId, smoothed: f64, previous: PumpState, action: PumpState) {
        let _ = (farm, smoothed, previous, action);
    }

    /// Persist learned state on clean shutdown. Default: nothing to persist.
    fn persist(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysOn;

    impl DecisionPolicy for AlwaysOn {
        fn name(&self) -> &'static str {
            "always-on"
        }

        fn recommend(&mut self, _: FarmId, _: f64, _: PumpState) -> PumpState {
            PumpState::On
        }
    }

    #[test]
    fn default_hooks_are_noops() {
        let mut p = AlwaysOn;

        // learn must not panic and persist must succeed for stateless policies.
        p.learn(FarmId::Farm1, 50.0, PumpState::Off, PumpState::On);
        assert!(p.persist().is_ok());
        assert_eq!(
            p.recommend(FarmId::Farm2, 50.0, PumpState::Off),
            PumpState::On
        );
    }
}
