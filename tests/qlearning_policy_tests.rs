// tests/qlearning_policy_tests.rs
//
// Q-learning variant through the public API: dataset pipeline into table
// creation, online updates during ticking, and the shutdown persistence
// contract (one artifact per farm, shape (10, 2, 2), finite values).

use std::fs;
use std::path::PathBuf;

use tokio::sync::watch;

use acequia::config::Config;
use acequia::dataset;
use acequia::logging::NoopSink;
use acequia::policy::qlearning::{moisture_bucket, reward, QTable};
use acequia::policy::{DecisionPolicy, QLearningPolicy};
use acequia::runner::ControlLoop;
use acequia::telemetry::TelemetrySnapshot;
use acequia::types::{FarmId, PumpState};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("acequia-it-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a small balanced dataset and run it through the full pipeline.
fn policy_from_csv(dir: &PathBuf) -> QLearningPolicy {
    let csv = dir.join("soil.csv");
    fs::write(
        &csv,
        "Soil Moisture,Temperature,Air Humidity,Pump Data\n\
         12.0,20.0,55.0,on\n\
         18.0,21.0,56.0,on\n\
         22.0,21.5,57.0,on\n\
         25.0,22.0,58.0,on\n\
         65.0,20.5,50.0,off\n\
         72.0,21.0,51.0,off\n\
         80.0,21.5,52.0,off\n\
         88.0,22.0,53.0,off\n",
    )
    .unwrap();

    let cfg = Config::default();
    let split = dataset::load_and_split(&csv, cfg.qlearning.shuffle_seed).unwrap();
    QLearningPolicy::from_split(&cfg.qlearning, &split, dir).unwrap()
}

#[test]
fn dataset_pipeline_builds_zeroed_tables() {
    let dir = scratch_dir("pipeline");
    let policy = policy_from_csv(&dir);

    for farm in FarmId::ALL {
        let table = policy.table(farm);
        assert!(table.all_finite());
        for bucket in 0..10 {
            for prev in 0..2 {
                for action in 0..2 {
                    assert_eq!(table.get(bucket, prev, action), 0.0);
                }
            }
        }
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn td_update_known_value() {
    // alpha=0.1, gamma=0.95, old=0, reward=1, next_max=0 -> 0.1.
    let dir = scratch_dir("td");
    let mut policy = policy_from_csv(&dir);

    policy.learn(FarmId::Farm1, 50.0, PumpState::Off, PumpState::Off);
    let got = policy
        .table(FarmId::Farm1)
        .get(moisture_bucket(50.0), 0, 0);
    assert!((got - 0.1).abs() < 1e-12);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn reward_spot_checks() {
    assert_eq!(reward(50.0, PumpState::Off), 1.0);
    assert!((reward(50.0, PumpState::On) - 0.9).abs() < 1e-12);
    assert_eq!(reward(10.0, PumpState::Off), -2.0);
    assert_eq!(reward(97.0, PumpState::Off), -2.0);
}

#[test]
fn bucket_spot_checks() {
    assert_eq!(moisture_bucket(95.0), 9);
    assert_eq!(moisture_bucket(0.0), 0);
}

#[tokio::test]
async fn shutdown_persists_two_finite_artifacts() {
    let dir = scratch_dir("shutdown");
    let policy = policy_from_csv(&dir);

    let mut cfg = Config::default();
    cfg.run.tick_interval = std::time::Duration::from_millis(1);

    let snapshot = TelemetrySnapshot {
        farm1_moisture: 15.0,
        farm2_moisture: 85.0,
        farm1_flow_meter: 1.0,
        farm2_flow_meter: 2.0,
    };

    let mut control = ControlLoop::new(&cfg, Box::new(policy), vec![Box::new(NoopSink)]);
    let (tx, rx) = watch::channel(false);

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        let _ = tx.send(true);
    });

    let summary = control.run(snapshot, rx).await.unwrap();
    canceller.await.unwrap();
    assert!(summary.ticks >= 1);

    // Exactly one artifact per farm, each a finite (10, 2, 2) table.
    for farm in FarmId::ALL {
        let path = dir.join(format!("final_q_table_{}.json", farm.tag()));
        let table = QTable::load(&path).unwrap();
        assert!(table.all_finite());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let outer = json.as_array().unwrap();
        assert_eq!(outer.len(), 10);
        for mid in outer {
            let mid = mid.as_array().unwrap();
            assert_eq!(mid.len(), 2);
            for inner in mid {
                assert_eq!(inner.as_array().unwrap().len(), 2);
            }
        }
    }

    fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn learning_shows_up_during_the_run() {
    let dir = scratch_dir("online");
    let policy = policy_from_csv(&dir);

    let mut cfg = Config::default();
    cfg.run.tick_interval = std::time::Duration::from_millis(1);

    // Farm 1 sits dry at 15%: its Off action in the dry bucket accrues
    // the failure-zone penalty tick after tick.
    let snapshot = TelemetrySnapshot {
        farm1_moisture: 15.0,
        farm2_moisture: 50.0,
        farm1_flow_meter: 1.0,
        farm2_flow_meter: 2.0,
    };

    let mut control = ControlLoop::new(&cfg, Box::new(policy), vec![Box::new(NoopSink)]);
    let (tx, rx) = watch::channel(false);
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        let _ = tx.send(true);
    });

    control.run(snapshot, rx).await.unwrap();
    canceller.await.unwrap();

    let table = QTable::load(&dir.join("final_q_table_farm1.json")).unwrap();
    let dry_off = table.get(moisture_bucket(15.0), PumpState::Off.index(), 0);
    assert!(
        dry_off < 0.0,
        "staying off in dry soil should look bad, got {}",
        dry_off
    );

    fs::remove_dir_all(&dir).ok();
}
