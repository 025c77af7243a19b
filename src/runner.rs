// src/runner.rs
//
// Control loop orchestrator. Owns the per-farm state, the engine and the
// installed policy; ticks on a fixed cadence until cancelled, then
// persists learned state and reports a run summary.
//
// Cancellation is an explicit watch-channel token checked at tick
// boundaries. The inter-tick sleep selects against it, so a ctrl-c lands
// without waiting out the full interval.

use anyhow::Context;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::config::Config;
use crate::engine::Engine;
use crate::logging::{CycleRecord, RecordSink};
use crate::metrics::{FarmSummary, RunSummary};
use crate::policy::DecisionPolicy;
use crate::state::{FarmState, LoopPhase};
use crate::telemetry::TelemetrySnapshot;
use crate::types::FarmId;

pub struct ControlLoop {
    cfg: Config,
    engine: Engine,
    policy: Box<dyn DecisionPolicy>,
    sinks: Vec<Box<dyn RecordSink>>,
    farms: [FarmState; 2],
    phase: LoopPhase,
    ticks: u64,
}

impl ControlLoop {
    pub fn new(
        cfg: &Config,
        policy: Box<dyn DecisionPolicy>,
        sinks: Vec<Box<dyn RecordSink>>,
    ) -> Self {
        Self {
            cfg: cfg.clone(),
            engine: Engine::new(cfg),
            policy,
            sinks,
            farms: [
                FarmState::new(FarmId::Farm1, cfg),
                FarmState::new(FarmId::Farm2, cfg),
            ],
            phase: LoopPhase::AwaitingInput,
            ticks: 0,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn farm(&self, id: FarmId) -> &FarmState {
        &self.farms[id.index()]
    }

    /// Run one full cycle: smooth, gate, decide and learn for both farms
    /// independently, then emit one record to every sink.
    ///
    /// The snapshot's raw readings are re-applied every tick and its flow
    /// meters pass through unchanged (single-sample telemetry contract).
    pub fn cycle(&mut self, snapshot: &TelemetrySnapshot) -> CycleRecord {
        let timestamp = chrono::Local::now()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let tick1 = self.engine.farm_tick(
            &mut self.farms[0],
            self.policy.as_mut(),
            snapshot.farm1_moisture,
        );
        let tick2 = self.engine.farm_tick(
            &mut self.farms[1],
            self.policy.as_mut(),
            snapshot.farm2_moisture,
        );

        let record = CycleRecord {
            timestamp,
            sender1: FarmId::Farm1.tag().to_string(),
            farm1_moisture: tick1.smoothed,
            farm1_flow_meter: snapshot.farm1_flow_meter,
            farm1_pump_state: tick1.pump,
            sender2: FarmId::Farm2.tag().to_string(),
            farm2_moisture: tick2.smoothed,
            farm2_flow_meter: snapshot.farm2_flow_meter,
            farm2_pump_state: tick2.pump,
        };

        for sink in &mut self.sinks {
            sink.emit(&record);
        }

        self.ticks += 1;
        record
    }

    /// Tick until cancelled, then persist learned state.
    ///
    /// Taking the parsed snapshot is what moves the loop out of
    /// AwaitingInput; input errors never reach this far. Per-cycle errors
    /// are not retried; persistence failure on the way out propagates.
    pub async fn run(
        &mut self,
        snapshot: TelemetrySnapshot,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<RunSummary> {
        self.phase = LoopPhase::Running;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.cycle(&snapshot);

            tokio::select! {
                _ = sleep(self.cfg.run.tick_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        println!("System stopped by user.");

        self.policy
            .persist()
            .context("persisting learned policy state")?;
        self.phase = LoopPhase::Stopped;

        Ok(self.summary())
    }

    pub fn summary(&self) -> RunSummary {
        let farm_summary = |farm: &FarmState| FarmSummary {
            sender: farm.id.tag(),
            moisture_mean: farm.moisture_stats.mean(),
            moisture_min: farm.moisture_stats.min(),
            moisture_max: farm.moisture_stats.max(),
            duty_cycle: farm.duty.duty(),
            final_pump_state: farm.pump,
        };

        RunSummary {
            version: self.cfg.version,
            policy: self.policy.name(),
            ticks: self.ticks,
            farm1: farm_summary(&self.farms[0]),
            farm2: farm_summary(&self.farms[1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoopSink;
    use crate::types::PumpState;

    struct AlwaysOn;

    impl DecisionPolicy for AlwaysOn {
        fn name(&self) -> &'static str {
            "always-on"
        }

        fn recommend(&mut self, _: FarmId, _: f64, _: PumpState) -> PumpState {
            PumpState::On
        }
    }

    fn snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            farm1_moisture: 15.0,
            farm2_moisture: 85.0,
            farm1_flow_meter: 3.2,
            farm2_flow_meter: 4.7,
        }
    }

    fn make_loop() -> ControlLoop {
        ControlLoop::new(
            &Config::default(),
            Box::new(AlwaysOn),
            vec![Box::new(NoopSink)],
        )
    }

    #[test]
    fn starts_awaiting_input() {
        let cl = make_loop();
        assert_eq!(cl.phase(), LoopPhase::AwaitingInput);
        assert_eq!(cl.ticks(), 0);
    }

    #[test]
    fn cycle_decides_farms_independently() {
        let mut cl = make_loop();
        let record = cl.cycle(&snapshot());

        // Farm 1 is dry and eligible; farm 2 sits in the deadband and
        // stays off no matter what the policy recommends.
        assert_eq!(record.farm1_pump_state, PumpState::On);
        assert_eq!(record.farm2_pump_state, PumpState::Off);
        assert_eq!(record.farm1_moisture, 15.0);
        assert_eq!(record.farm2_moisture, 85.0);
        assert_eq!(record.farm1_flow_meter, 3.2);
        assert_eq!(record.farm2_flow_meter, 4.7);
        assert_eq!(cl.ticks(), 1);
    }

    #[test]
    fn flow_meters_pass_through_every_cycle() {
        let mut cl = make_loop();
        let snap = snapshot();

        for _ in 0..3 {
            let record = cl.cycle(&snap);
            assert_eq!(record.farm1_flow_meter, snap.farm1_flow_meter);
            assert_eq!(record.farm2_flow_meter, snap.farm2_flow_meter);
        }
    }

    #[test]
    fn timestamp_has_the_wire_shape() {
        let mut cl = make_loop();
        let record = cl.cycle(&snapshot());

        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(record.timestamp.len(), 19);
        assert_eq!(&record.timestamp[4..5], "-");
        assert_eq!(&record.timestamp[10..11], " ");
        assert_eq!(&record.timestamp[13..14], ":");
    }

    #[tokio::test]
    async fn run_stops_on_cancellation_and_reports() {
        let mut cfg = Config::default();
        cfg.run.tick_interval = std::time::Duration::from_millis(1);

        let mut cl = ControlLoop::new(&cfg, Box::new(AlwaysOn), vec![Box::new(NoopSink)]);
        let (tx, rx) = watch::channel(false);

        let cancel = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            let _ = tx.send(true);
        });

        let summary = cl.run(snapshot(), rx).await.unwrap();
        cancel.await.unwrap();

        assert_eq!(cl.phase(), LoopPhase::Stopped);
        assert!(summary.ticks >= 1);
        assert_eq!(summary.policy, "always-on");
        assert_eq!(summary.farm1.final_pump_state, PumpState::On);
        assert_eq!(summary.farm2.final_pump_state, PumpState::Off);
        assert!((summary.farm1.duty_cycle - 1.0).abs() < 1e-12);
        assert_eq!(summary.farm2.duty_cycle, 0.0);
    }

    #[tokio::test]
    async fn pre_cancelled_token_stops_before_any_tick() {
        let mut cl = make_loop();
        let (tx, rx) = watch::channel(true);
        drop(tx);

        let summary = cl.run(snapshot(), rx).await.unwrap();
        assert_eq!(summary.ticks, 0);
        assert_eq!(cl.phase(), LoopPhase::Stopped);
    }
}
