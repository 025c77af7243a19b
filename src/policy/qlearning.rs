// src/policy/qlearning.rs
//
// Online tabular Q-learning policy. One value table per farm, indexed by
// (moisture bucket, previous pump state, action), updated every cycle via
// the standard temporal-difference rule and persisted on clean shutdown.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::QLearningConfig;
use crate::dataset::FarmSplit;
use crate::types::{FarmId, PumpState};

use super::DecisionPolicy;

/// Fixed-width moisture discretization: one bucket per 10%.
pub const NUM_MOISTURE_BUCKETS: usize = 10;
/// Previous-state axis: Off = 0, On = 1.
pub const NUM_PUMP_STATES: usize = 2;
/// Action axis: Off = 0, On = 1.
pub const NUM_ACTIONS: usize = 2;

/// Discretize a moisture percentage into [0, 9].
///
/// Out-of-range values clamp from both ends; nothing is ever rejected.
pub fn moisture_bucket(moisture: f64) -> usize {
    (moisture / 10.0)
        .floor()
        .clamp(0.0, (NUM_MOISTURE_BUCKETS - 1) as f64) as usize
}

/// Per-cycle reward for a realized (moisture, action) pair.
///
/// +1 inside the healthy band [30, 90], -2 in the failure zones (< 20 or
/// > 95), 0 in the gaps between them; running the pump always costs 0.1.
pub fn reward(moisture: f64, action: PumpState) -> f64 {
    let mut r = if (30.0..=90.0).contains(&moisture) {
        1.0
    } else if moisture < 20.0 || moisture > 95.0 {
        -2.0
    } else {
        0.0
    };
    if action.is_on() {
        r -= 0.1;
    }
    r
}

/// Value table for one farm, shape (10, 2, 2).
///
/// Serializes transparently as nested arrays, which is also the on-disk
/// artifact format used for shutdown persistence and reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    entries: [[[f64; NUM_ACTIONS]; NUM_PUMP_STATES]; NUM_MOISTURE_BUCKETS],
}

impl QTable {
    /// All-zero table.
    pub fn zeroed() -> Self {
        Self {
            entries: [[[0.0; NUM_ACTIONS]; NUM_PUMP_STATES]; NUM_MOISTURE_BUCKETS],
        }
    }

    pub fn get(&self, bucket: usize, prev: usize, action: usize) -> f64 {
        self.entries[bucket][prev][action]
    }

    pub fn set(&mut self, bucket: usize, prev: usize, action: usize, value: f64) {
        self.entries[bucket][prev][action] = value;
    }

    /// Greedy action for a state. Ties resolve to Off (lowest index).
    pub fn best_action(&self, bucket: usize, prev: usize) -> PumpState {
        let values = &self.entries[bucket][prev];
        if values[PumpState::On.index()] > values[PumpState::Off.index()] {
            PumpState::On
        } else {
            PumpState::Off
        }
    }

    /// Largest action value for a state.
    pub fn max_value(&self, bucket: usize, prev: usize) -> f64 {
        let values = &self.entries[bucket][prev];
        values[0].max(values[1])
    }

    pub fn all_finite(&self) -> bool {
        self.entries
            .iter()
            .flatten()
            .flatten()
            .all(|v| v.is_finite())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating artifact dir {}", parent.display()))?;
            }
        }
        let file = File::create(path)
            .with_context(|| format!("creating Q-table artifact {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("writing Q-table artifact {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening Q-table artifact {}", path.display()))?;
        let table: QTable = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing Q-table artifact {}", path.display()))?;
        anyhow::ensure!(
            table.all_finite(),
            "Q-table artifact {} contains non-finite values",
            path.display()
        );
        Ok(table)
    }
}

/// Online Q-learning decision policy with one table per farm.
pub struct QLearningPolicy {
    tables: [QTable; 2],
    learning_rate: f64,
    discount_factor: f64,
    artifact_paths: [PathBuf; 2],
}

impl QLearningPolicy {
    /// Build per-farm tables from a balanced historical split.
    ///
    /// The split only seeds table creation: it must hold rows for both
    /// farms, but entries start at zero rather than being pretrained. If an
    /// artifact from a previous run already exists for a farm, that table
    /// is reloaded so learning resumes across runs.
    pub fn from_split(
        cfg: &QLearningConfig,
        split: &FarmSplit,
        artifact_dir: &Path,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !split.farm1.is_empty() && !split.farm2.is_empty(),
            "historical split left a farm with no rows"
        );

        let mut tables = [QTable::zeroed(), QTable::zeroed()];
        let mut artifact_paths = [PathBuf::new(), PathBuf::new()];

        for farm in FarmId::ALL {
            let path = artifact_dir.join(format!("final_q_table_{}.json", farm.tag()));
            if path.exists() {
                tables[farm.index()] = QTable::load(&path)?;
            }
            artifact_paths[farm.index()] = path;
        }

        Ok(Self {
            tables,
            learning_rate: cfg.learning_rate,
            discount_factor: cfg.discount_factor,
            artifact_paths,
        })
    }

    pub fn table(&self, farm: FarmId) -> &QTable {
        &self.tables[farm.index()]
    }

    pub fn artifact_paths(&self) -> &[PathBuf; 2] {
        &self.artifact_paths
    }
}

impl DecisionPolicy for QLearningPolicy {
    fn name(&self) -> &'static str {
        "qlearning"
    }

    fn recommend(&mut self, farm: FarmId, smoothed: f64, previous: PumpState) -> PumpState {
        let bucket = moisture_bucket(smoothed);
        self.tables[farm.index()].best_action(bucket, previous.index())
    }

    /// TD update with a myopic one-step horizon: the next state pairs the
    /// same moisture reading with the action just taken, since no new
    /// reading is sampled mid-cycle.
    fn learn(&mut self, farm: FarmId, smoothed: f64, previous: PumpState, action: PumpState) {
        let r = reward(smoothed, action);
        let bucket = moisture_bucket(smoothed);
        let table = &mut self.tables[farm.index()];

        let next_max = table.max_value(bucket, action.index());
        let old = table.get(bucket, previous.index(), action.index());
        let new = (1.0 - self.learning_rate) * old
            + self.learning_rate * (r + self.discount_factor * next_max);

        table.set(bucket, previous.index(), action.index(), new);
    }

    fn persist(&self) -> anyhow::Result<()> {
        for farm in FarmId::ALL {
            self.tables[farm.index()].save(&self.artifact_paths[farm.index()])?;
        }
        Ok(())
    }
}
