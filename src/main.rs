// src/main.rs
//
// Thin harness around the acequia library.
// All of the real logic lives in the lib crate (engine, runner, policies).

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::watch;

use acequia::dataset;
use acequia::policy::{BangBangPolicy, ClassifierPolicy, DecisionPolicy, QLearningPolicy};
use acequia::telemetry::error_record;
use acequia::{Config, ControlLoop, FileSink, RecordSink, StdoutSink, TelemetrySnapshot};

/// Decision policy variant installed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    /// Pretrained static classifier.
    Classifier,
    /// Online tabular Q-learning (persists its tables on shutdown).
    Qlearning,
    /// External two-state relay controller.
    Bangbang,
}

/// Command-line arguments for the acequia binary.
#[derive(Parser, Debug)]
#[command(name = "acequia")]
struct Cli {
    /// Decision policy to install (default: qlearning).
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Pretrained model artifact (classifier policy).
    #[arg(long, default_value = "best_model.json")]
    model: PathBuf,

    /// Historical labeled soil dataset (q-learning policy).
    #[arg(long, default_value = "mapped_soil_data.csv")]
    dataset: PathBuf,

    /// Directory for per-farm Q-table artifacts (q-learning policy).
    #[arg(long, default_value = ".")]
    qtable_dir: PathBuf,

    /// Seconds between ticks (default 10).
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Optional JSONL path for a tick log alongside stdout.
    #[arg(long)]
    log_jsonl: Option<String>,
}

/// Build Config from defaults, then apply CLI + env research overrides.
///
/// This keeps src/config.rs as the single source of truth, while letting
/// research harnesses sweep parameters via environment variables.
fn build_config_from_env_and_args(cli: &Cli) -> Config {
    let mut cfg = Config::default();

    // ---------- CLI overrides ----------

    if let Some(secs) = cli.tick_secs {
        cfg.run.tick_interval = Duration::from_secs(secs.max(1));
    }

    // ---------- Env overrides (research knobs) ----------

    if let Ok(raw) = std::env::var("ACEQUIA_LOWER_THRESHOLD") {
        if let Ok(v) = raw.parse::<f64>() {
            cfg.hysteresis.lower_threshold = v;
        }
    }

    if let Ok(raw) = std::env::var("ACEQUIA_UPPER_THRESHOLD") {
        if let Ok(v) = raw.parse::<f64>() {
            cfg.hysteresis.upper_threshold = v;
        }
    }

    if let Ok(raw) = std::env::var("ACEQUIA_BUFFER_ZONE") {
        if let Ok(v) = raw.parse::<f64>() {
            cfg.hysteresis.buffer_zone = v;
        }
    }

    if let Ok(raw) = std::env::var("ACEQUIA_LEARNING_RATE") {
        if let Ok(v) = raw.parse::<f64>() {
            cfg.qlearning.learning_rate = v;
        }
    }

    if let Ok(raw) = std::env::var("ACEQUIA_DISCOUNT_FACTOR") {
        if let Ok(v) = raw.parse::<f64>() {
            cfg.qlearning.discount_factor = v;
        }
    }

    cfg
}

/// Build the installed policy from the CLI selection.
fn build_policy(cli: &Cli, cfg: &Config) -> anyhow::Result<Box<dyn DecisionPolicy>> {
    match cli.policy.unwrap_or(PolicyKind::Qlearning) {
        PolicyKind::Classifier => Ok(Box::new(ClassifierPolicy::from_artifact(&cli.model)?)),
        PolicyKind::Qlearning => {
            let split = dataset::load_and_split(&cli.dataset, cfg.qlearning.shuffle_seed)?;
            Ok(Box::new(QLearningPolicy::from_split(
                &cfg.qlearning,
                &split,
                &cli.qtable_dir,
            )?))
        }
        PolicyKind::Bangbang => Ok(Box::new(BangBangPolicy::new(
            cfg.hysteresis.upper_threshold,
        ))),
    }
}

/// Stdout always carries the per-tick records; a JSONL file sink is added
/// when requested. A sink that fails to open is reported and skipped
/// rather than aborting the run.
fn build_sinks(log_jsonl: Option<&str>) -> Vec<Box<dyn RecordSink>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(StdoutSink)];

    if let Some(path) = log_jsonl {
        match FileSink::create(path) {
            Ok(s) => sinks.push(Box::new(s)),
            Err(err) => {
                eprintln!("Failed to create log file ({path}), keeping stdout only: {err}");
            }
        }
    }

    sinks
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 0) Parse CLI args, build config with env overrides.
    let cli = Cli::parse();
    let cfg = build_config_from_env_and_args(&cli);

    // 1) One telemetry line, read exactly once at startup. Missing or
    //    broken input is a structured error record and a clean exit.
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading telemetry from stdin")?;

    if line.trim().is_empty() {
        println!("{}", error_record("No input provided"));
        return Ok(());
    }

    let snapshot = match TelemetrySnapshot::parse_line(&line) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            println!("{}", error_record(&format!("{err:#}")));
            return Ok(());
        }
    };

    // 2) Install the selected policy and the record sinks.
    let policy = build_policy(&cli, &cfg)?;
    let sinks = build_sinks(cli.log_jsonl.as_deref());

    // 3) Cancellation token: ctrl-c flips the watch channel, the loop
    //    notices at the next tick boundary (or mid-sleep).
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    // 4) Tick until cancelled, then report.
    let mut control = ControlLoop::new(&cfg, policy, sinks);
    let summary = control.run(snapshot, stop_rx).await?;

    println!("{}", serde_json::to_string(&summary)?);
    println!("Program terminated.");

    Ok(())
}
