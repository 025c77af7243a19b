// src/dataset.rs
//
// Historical labeled soil dataset. Only used at startup by the Q-learning
// variant: rows are balanced across the two pump labels, shuffled with a
// fixed seed, and split evenly across the farms to drive table creation.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::types::PumpState;

const MOISTURE_COLUMN: &str = "Soil Moisture";
const PUMP_COLUMN: &str = "Pump Data";

/// One historical observation: a moisture reading and the pump label
/// recorded for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub moisture: f64,
    pub pump: PumpState,
}

/// Balanced, shuffled dataset halves, one per farm.
#[derive(Debug, Clone)]
pub struct FarmSplit {
    pub farm1: Vec<LabeledSample>,
    pub farm2: Vec<LabeledSample>,
}

/// Load labeled samples from a CSV file.
///
/// The file must carry a header naming the "Soil Moisture" and "Pump Data"
/// columns; any other columns are ignored. Malformed rows are errors, not
/// skips. A broken dataset should stop startup.
pub fn load_csv(path: &Path) -> anyhow::Result<Vec<LabeledSample>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading dataset {}", path.display()))?;
    let mut lines = text.lines();

    let header = match lines.next() {
        Some(h) => h,
        None => bail!("dataset {} is empty", path.display()),
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let moisture_col = columns
        .iter()
        .position(|c| *c == MOISTURE_COLUMN)
        .with_context(|| format!("dataset {} has no '{}' column", path.display(), MOISTURE_COLUMN))?;
    let pump_col = columns
        .iter()
        .position(|c| *c == PUMP_COLUMN)
        .with_context(|| format!("dataset {} has no '{}' column", path.display(), PUMP_COLUMN))?;

    let mut samples = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let row = line_no + 2; // 1-based, counting the header

        let moisture_raw = fields
            .get(moisture_col)
            .with_context(|| format!("dataset row {} is missing the moisture field", row))?;
        let moisture: f64 = moisture_raw
            .parse()
            .with_context(|| format!("dataset row {}: bad moisture value '{}'", row, moisture_raw))?;

        let pump_raw = fields
            .get(pump_col)
            .with_context(|| format!("dataset row {} is missing the pump field", row))?;
        let pump = match pump_raw.to_ascii_lowercase().as_str() {
            "on" => PumpState::On,
            "off" => PumpState::Off,
            other => bail!("dataset row {}: unknown pump label '{}'", row, other),
        };

        samples.push(LabeledSample { moisture, pump });
    }

    Ok(samples)
}

/// Balance the two pump classes, shuffle deterministically, and split the
/// result evenly across the farms.
///
/// Each class is downsampled to the size of the smaller one; a class with
/// zero rows is an error (an all-on or all-off dataset cannot seed the
/// tables).
pub fn balance_and_split(samples: &[LabeledSample], seed: u64) -> anyhow::Result<FarmSplit> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut on_rows: Vec<LabeledSample> =
        samples.iter().copied().filter(|s| s.pump.is_on()).collect();
    let mut off_rows: Vec<LabeledSample> =
        samples.iter().copied().filter(|s| !s.pump.is_on()).collect();

    let min_size = on_rows.len().min(off_rows.len());
    if min_size == 0 {
        bail!(
            "dataset is unusable: {} 'on' rows, {} 'off' rows",
            on_rows.len(),
            off_rows.len()
        );
    }

    on_rows.shuffle(&mut rng);
    off_rows.shuffle(&mut rng);
    on_rows.truncate(min_size);
    off_rows.truncate(min_size);

    let mut balanced = on_rows;
    balanced.extend(off_rows);
    balanced.shuffle(&mut rng);

    let mid = balanced.len() / 2;
    let farm2 = balanced.split_off(mid);

    Ok(FarmSplit {
        farm1: balanced,
        farm2,
    })
}

/// Load, balance and split in one step.
pub fn load_and_split(path: &Path, seed: u64) -> anyhow::Result<FarmSplit> {
    let samples = load_csv(path)?;
    balance_and_split(&samples, seed)
}
