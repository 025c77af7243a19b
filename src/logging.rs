// src/logging.rs
//
// Per-tick record sinks.
// - RecordSink: trait used by the control loop
// - StdoutSink: one JSON object per tick on stdout (the primary interface)
// - FileSink:   JSONL file for offline analysis
// - NoopSink:   discards all records

use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::{Deserialize, Serialize};

use crate::types::PumpState;

/// One emitted decision record, constructed fresh each cycle.
///
/// Field names are the external wire contract and must stay exactly as
/// they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Local time, "YYYY-MM-DD HH:MM:SS".
    pub timestamp: String,
    pub sender1: String,
    #[serde(rename = "Farm1_moisture")]
    pub farm1_moisture: f64,
    #[serde(rename = "Farm1_flow_meter")]
    pub farm1_flow_meter: f64,
    #[serde(rename = "Farm1_pump_state")]
    pub farm1_pump_state: PumpState,
    pub sender2: String,
    #[serde(rename = "Farm2_moisture")]
    pub farm2_moisture: f64,
    #[serde(rename = "Farm2_flow_meter")]
    pub farm2_flow_meter: f64,
    #[serde(rename = "Farm2_pump_state")]
    pub farm2_pump_state: PumpState,
}

/// Abstract sink for per-tick records.
pub trait RecordSink: Send {
    fn emit(&mut self, record: &CycleRecord);
}

/// Primary sink: one JSON object per line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl RecordSink for StdoutSink {
    fn emit(&mut self, record: &CycleRecord) {
        if let Ok(line) = serde_json::to_string(record) {
            println!("{}", line);
        }
    }
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl RecordSink for NoopSink {
    fn emit(&mut self, _record: &CycleRecord) {
        // intentionally no-op
    }
}

/// JSONL file sink.
///
/// Each tick is written as a single JSON object on its own line. Sink I/O
/// failures are swallowed; a full disk must not stop the pumps.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create(path: &str) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl RecordSink for FileSink {
    fn emit(&mut self, record: &CycleRecord) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = self.writer.write_all(line.as_bytes());
            let _ = self.writer.write_all(b"\n");
            let _ = self.writer.flush();
        }
    }
}
