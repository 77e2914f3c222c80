//! # Pod SDA
//!
//! Loads `pod.toml` and the abort-range table, performs RT setup, opens the
//! telemetry socket and the session log, and runs the State Determination
//! Algorithm until quit (SIGINT, operator request or a fatal state).
//!
//! The hardware driver lives outside this crate; the binary drives the
//! deterministic flight simulator.

use clap::Parser;
use pod_sda::config::load_config;
use pod_sda::cycle::{Collaborators, CycleRunner};
use pod_sda::error::SdaError;
use pod_sda::io::{CommandSource, FileLogSink, IdleCommands, SystemClock, UdpTransport};
use pod_sda::rt::RtProfile;
use pod_sda::sim::autopilot::AutoPilot;
use pod_sda::sim::physics::FlightSimulator;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// HyperLynx pod State Determination Algorithm
#[derive(Parser, Debug)]
#[command(name = "pod_sda")]
#[command(author = "HyperLynx")]
#[command(version)]
#[command(about = "Cyclic safety and state control core for the HyperLynx pod")]
struct Args {
    /// Path to the pod configuration TOML.
    #[arg(long, default_value = "config/pod.toml")]
    config: PathBuf,

    /// Arm and launch automatically, crawl, abort and quit.
    #[arg(long)]
    auto_launch: bool,

    /// Crawl distance before the automatic abort [ft].
    #[arg(long, default_value_t = 100.0)]
    crawl_distance: f64,

    /// Stop after this many seconds of run time.
    #[arg(long, value_name = "SECONDS")]
    sim_duration: Option<f64>,

    /// CPU core to pin the cycle thread to (rt feature).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt feature).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Pod SDA v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Pod SDA shutdown complete");
}

fn run(args: &Args) -> Result<(), SdaError> {
    let loaded = load_config(&args.config)?;
    info!(
        "Config OK: poll_interval={}ms, abort rows={}, telemetry={}",
        loaded.pod.cycle.poll_interval_ms,
        loaded.abort_table.len(),
        loaded.pod.telemetry.endpoint,
    );

    RtProfile {
        cpu_core: args.cpu_core,
        priority: args.rt_priority,
    }
    .apply()?;

    let quit = Arc::new(AtomicBool::new(false));
    let q = quit.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        q.store(true, Ordering::SeqCst);
    })?;

    let mut pod = FlightSimulator::new(loaded.pod.thresholds.brake_ready_pressure);
    let mut autopilot = AutoPilot::new(args.crawl_distance);
    let mut idle = IdleCommands;
    let commands: &mut dyn CommandSource = if args.auto_launch {
        &mut autopilot
    } else {
        &mut idle
    };
    let mut telemetry = UdpTransport::connect(&loaded.pod.telemetry.endpoint)?;
    let mut log = FileLogSink::create(&loaded.pod.log.directory)?;
    let mut clock = SystemClock::new();
    info!("Session log: {}", log.path().display());

    let io = Collaborators {
        pod: &mut pod,
        commands,
        telemetry: &mut telemetry,
        log: &mut log,
        clock: &mut clock,
    };
    let mut runner = CycleRunner::new(loaded, io, quit);
    if let Some(seconds) = args.sim_duration {
        runner = runner.with_deadline(Duration::from_secs_f64(seconds.max(0.0)));
    }

    let stats = runner.run();
    let machine = runner.machine();
    info!(
        "Run complete: cycles={}, state={}, total_faults={}, telemetry sent/dropped={}/{}, log writes/dropped={}/{}",
        stats.cycles,
        machine.state(),
        machine.total_faults(),
        stats.telemetry_sent,
        stats.telemetry_dropped,
        stats.log_writes,
        stats.log_dropped,
    );

    if machine.is_fatal() {
        return Err(SdaError::Fatal(machine.state()));
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI args.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
