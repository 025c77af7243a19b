//! Acequia core library.
//!
//! Periodic irrigation decision loop for two independently-managed farms:
//! a smoothing buffer and hysteresis gate feed a pluggable decision policy
//! (static classifier, online tabular Q-learning, or a bang-bang relay),
//! and the loop emits one JSON record per tick. The binary (`src/main.rs`)
//! is just a thin harness around these components.

pub mod buffer;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod hysteresis;
pub mod logging;
pub mod metrics;
pub mod policy;
pub mod runner;
pub mod state;
pub mod telemetry;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use buffer::SensorBuffer;

pub use config::Config;

pub use engine::{Engine, FarmTick};

pub use hysteresis::HysteresisGate;

pub use logging::{CycleRecord, FileSink, NoopSink, RecordSink, StdoutSink};

pub use metrics::RunSummary;

pub use policy::{
    BangBangPolicy, ClassifierPolicy, DecisionPolicy, LinearModel, QLearningPolicy,
};

pub use runner::ControlLoop;

pub use state::{FarmState, LoopPhase};

pub use telemetry::TelemetrySnapshot;

pub use types::{FarmId, PumpState};

// --- End-to-end decision tests ----------------------------------------------
