// src/telemetry.rs
//
// Startup telemetry ingestion. One structured line on stdin carries both
// farms' raw moisture and flow-meter readings; it is read exactly once and
// reused for every tick (single-sample telemetry contract).

use anyhow::Context;
use serde::Deserialize;

/// The four raw readings consumed at process start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub farm1_moisture: f64,
    pub farm2_moisture: f64,
    pub farm1_flow_meter: f64,
    pub farm2_flow_meter: f64,
}

// Wire shape: {"data": {"h1": .., "h3": .., "V_Meter_2": .., "V_Meter_3": ..}}
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    data: WireReadings,
}

#[derive(Debug, Deserialize)]
struct WireReadings {
    h1: f64,
    h3: f64,
    #[serde(rename = "V_Meter_2")]
    v_meter_2: f64,
    #[serde(rename = "V_Meter_3")]
    v_meter_3: f64,
}

impl TelemetrySnapshot {
    /// Parse one telemetry line.
    pub fn parse_line(line: &str) -> anyhow::Result<Self> {
        let envelope: WireEnvelope =
            serde_json::from_str(line.trim()).context("parsing telemetry input line")?;
        Ok(Self {
            farm1_moisture: envelope.data.h1,
            farm2_moisture: envelope.data.h3,
            farm1_flow_meter: envelope.data.v_meter_2,
            farm2_flow_meter: envelope.data.v_meter_3,
        })
    }
}

/// Structured error record emitted when startup input is missing or broken.
pub fn error_record(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
