// src/types.rs
//
// Common shared types for the acequia control loop.

use serde::{Deserialize, Serialize};

/// Binary actuator state for an irrigation pump.
///
/// Serializes as `"on"` / `"off"`, which is also the wire form used in the
/// per-tick output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpState {
    Off,
    On,
}

impl PumpState {
    pub fn is_on(self) -> bool {
        matches!(self, PumpState::On)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PumpState::Off => "off",
            PumpState::On => "on",
        }
    }

    /// Table index for this state: Off = 0, On = 1.
    pub fn index(self) -> usize {
        match self {
            PumpState::Off => 0,
            PumpState::On => 1,
        }
    }

    pub fn from_index(index: usize) -> PumpState {
        if index == 1 {
            PumpState::On
        } else {
            PumpState::Off
        }
    }
}

/// One of the two independently-managed farms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmId {
    Farm1,
    Farm2,
}

impl FarmId {
    pub const ALL: [FarmId; 2] = [FarmId::Farm1, FarmId::Farm2];

    /// Sender tag used in output records ("farm1" / "farm2").
    pub fn tag(self) -> &'static str {
        match self {
            FarmId::Farm1 => "farm1",
            FarmId::Farm2 => "farm2",
        }
    }

    pub fn index(self) -> usize {
        match self {
            FarmId::Farm1 => 0,
            FarmId::Farm2 => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pump_state_wire_form() {
        assert_eq!(serde_json::to_string(&PumpState::On).unwrap(), "\"on\"");
        assert_eq!(serde_json::to_string(&PumpState::Off).unwrap(), "\"off\"");

        let parsed: PumpState = serde_json::from_str("\"on\"").unwrap();
        assert_eq!(parsed, PumpState::On);
    }

    #[test]
    fn pump_state_index_round_trip() {
        assert_eq!(PumpState::Off.index(), 0);
        assert_eq!(PumpState::On.index(), 1);
        assert_eq!(PumpState::from_index(0), PumpState::Off);
        assert_eq!(PumpState::from_index(1), PumpState::On);
    }

    #[test]
    fn farm_tags() {
        assert_eq!(FarmId::Farm1.tag(), "farm1");
        assert_eq!(FarmId::Farm2.tag(), "farm2");
        assert_eq!(FarmId::ALL[0].index(), 0);
        assert_eq!(FarmId::ALL[1].index(), 1);
    }
}
