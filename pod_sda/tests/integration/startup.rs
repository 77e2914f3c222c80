//! Integration test: startup and configuration wiring.
//!
//! Configuration from disk, the initial command table, session log output
//! and the fatal handling of states outside the forward cycle.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use pod_common::sensor::SensorKey;
use pod_common::state::PodState;
use pod_sda::config::{load_config, load_config_from_strings};
use pod_sda::cycle::{Collaborators, CycleRunner};
use pod_sda::io::{FileLogSink, IdleCommands, LOG_HEADER, ManualClock, MemoryTransport};
use pod_sda::sim::physics::FlightSimulator;
use pod_sda::state::machine::PodStateMachine;
use tempfile::TempDir;

use super::{ABORT_TABLE, POD_TOML, Rig, loaded};

fn run_from(state: PodState) {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut idle = IdleCommands;
    let mut runner = rig
        .runner(cfg, &mut idle)
        .with_machine(PodStateMachine::starting_in(state))
        .with_deadline(Duration::from_secs(10));

    let stats = runner.run();

    assert_eq!(stats.cycles, 1, "run did not stop on the fatal condition");
    assert!(runner.machine().is_fatal());
    assert!(runner.machine().is_faulted());
    assert!(runner.should_quit());
    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
}

#[test]
fn coasting_is_fatal() {
    run_from(PodState::Coasting);
}

#[test]
fn fault_state_is_fatal() {
    run_from(PodState::Fault);
}

#[test]
fn config_and_table_load_from_disk() {
    let tmp = TempDir::new().unwrap();
    let pod_path = tmp.path().join("pod.toml");
    fs::write(&pod_path, format!("abort_ranges = \"ranges.dat\"\n{POD_TOML}")).unwrap();
    fs::write(tmp.path().join("ranges.dat"), ABORT_TABLE).unwrap();

    let cfg = load_config(&pod_path).unwrap();
    assert_eq!(cfg.abort_table.len(), 3);

    let mut rig = Rig::new(&cfg);
    let mut idle = IdleCommands;
    let runner = rig.runner(cfg, &mut idle);

    // LVBatt and IMU1_X in four states, Brake_Pressure in two.
    assert_eq!(runner.registry().len(), 10);
    let entry = runner
        .registry()
        .lookup(PodState::Crawling, SensorKey::BrakePressure)
        .unwrap();
    assert!(entry.trigger);
    assert_eq!((entry.low, entry.high), (150.0, 250.0));
    assert!(
        runner
            .registry()
            .lookup(PodState::SafeToApproach, SensorKey::BrakePressure)
            .is_none()
    );
}

#[test]
fn initial_command_table_is_applied_on_first_cycle() {
    let toml = format!("{POD_TOML}\n[commands]\nhigh_voltage = true\ncoolant_pump = true\n");
    let cfg = load_config_from_strings(&toml, ABORT_TABLE).unwrap();
    let mut rig = Rig::new(&cfg);
    let mut idle = IdleCommands;
    let mut runner = rig.runner(cfg, &mut idle);

    runner.step();
    assert!(runner.actuators().high_voltage);
    assert!(runner.actuators().coolant_pump);
    assert!(!runner.actuators().reservoir_1);

    assert!(rig.pod.high_voltage());
    assert!(rig.pod.coolant_pump());
}

#[test]
fn first_log_write_lists_every_reading() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut idle = IdleCommands;
    let mut runner = rig.runner(cfg, &mut idle);

    runner.step();

    assert_eq!(rig.log.writes, 1);
    assert_eq!(rig.log.lines.len(), SensorKey::COUNT);
    assert_eq!(rig.log.lines[0], "BMS_Conn\t1\t0\t0.000000");
    assert!(
        rig.log
            .lines
            .iter()
            .any(|l| l == "Brake_Pressure\t0\t0\t0.000000")
    );
}

#[test]
fn session_log_file_has_header_and_rows() {
    let tmp = TempDir::new().unwrap();
    let cfg = loaded();
    let mut pod = FlightSimulator::new(cfg.pod.thresholds.brake_ready_pressure);
    let mut idle = IdleCommands;
    let mut telemetry = MemoryTransport::default();
    let mut log = FileLogSink::create(&tmp.path().join("logs")).unwrap();
    let mut clock = ManualClock::new();

    let io = Collaborators {
        pod: &mut pod,
        commands: &mut idle,
        telemetry: &mut telemetry,
        log: &mut log,
        clock: &mut clock,
    };
    let mut runner = CycleRunner::new(cfg, io, Arc::new(AtomicBool::new(false)))
        .with_deadline(Duration::from_millis(250));
    let stats = runner.run();
    assert_eq!(stats.log_writes, 3);

    let text = fs::read_to_string(log.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], LOG_HEADER);
    assert_eq!(lines.len(), 1 + 3 * SensorKey::COUNT);
    assert!(lines.last().unwrap().ends_with("\t0.200000"));
}

#[test]
fn shipped_configuration_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/pod.toml");
    let cfg = load_config(&path).unwrap();

    assert!(cfg.pod.flight.all_set());
    assert_eq!(cfg.abort_table.len(), 22);

    let mut rig = Rig::new(&cfg);
    let mut idle = IdleCommands;
    let mut runner = rig.runner(cfg, &mut idle);
    runner.step();
    assert_eq!(runner.machine().total_faults(), 0);
}
