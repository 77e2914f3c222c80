//! Integration test: abort paths.
//!
//! Trigger violations, accumulated non-trigger faults, operator aborts and
//! the faulted pre-abort, each driven through full cycles.

use std::time::Duration;

use pod_common::sensor::SensorKey;
use pod_common::state::PodState;
use pod_sda::config::load_config_from_strings;
use pod_sda::io::IdleCommands;
use pod_sda::sim::physics::{CHARGED_PRESSURE, FlightSimulator};
use pod_sda::state::machine::{AbortOutcome, PodStateMachine};

use super::{ABORT, POD_TOML, Rig, loaded, script};

fn pod() -> FlightSimulator {
    FlightSimulator::new(loaded().pod.thresholds.brake_ready_pressure)
}

#[test]
fn low_brake_pressure_in_launch_triggers_abort() {
    let mut rig = Rig::with_pod(pod().with_speed(100.0).with_brake_pressure(100.0));
    let mut idle = IdleCommands;
    let mut runner = rig
        .runner(loaded(), &mut idle)
        .with_machine(PodStateMachine::starting_in(PodState::Launching));

    runner.step();

    let eval = runner.last_eval();
    assert!(eval.triggered);
    assert_eq!(eval.total_new_faults, 1);
    assert_eq!(
        eval.abort,
        Some(AbortOutcome::Aborted {
            from: PodState::Launching,
            to: PodState::BrakingLow
        })
    );
    assert_eq!(runner.machine().state(), PodState::BrakingLow);
    assert!(runner.machine().is_faulted());
    assert!(
        runner
            .registry()
            .is_faulted(PodState::Launching, SensorKey::BrakePressure)
    );
    assert!(
        !runner
            .registry()
            .is_faulted(PodState::Crawling, SensorKey::BrakePressure)
    );
}

#[test]
fn triggered_pod_brakes_to_a_stop() {
    let mut rig = Rig::with_pod(pod().with_speed(100.0).with_brake_pressure(100.0));
    let mut idle = IdleCommands;
    let mut runner = rig
        .runner(loaded(), &mut idle)
        .with_machine(PodStateMachine::starting_in(PodState::Launching))
        .with_deadline(Duration::from_secs(10));

    runner.run();

    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
    assert!(runner.machine().is_faulted());
    assert_eq!(runner.machine().total_faults(), 1);
    assert!(!runner.machine().is_fatal());
    assert_eq!(rig.pod.speed(), 0.0);
}

#[test]
fn non_trigger_fault_blocks_launch() {
    let table = "\
Label\tLow\tHigh\tSafeToApproach\tLaunching\tBrakingHigh\tCrawling\tTrigger\tFault
LVBatt_Voltage\t12\t15\t1\t1\t1\t1\t0\t0
";
    let cfg = load_config_from_strings(POD_TOML, table).unwrap();
    let mut rig = Rig::new(&cfg);
    let mut operator = script(|_status, cmds| {
        cmds.high_voltage = true;
        cmds.reservoir_1 = true;
        cmds.launch = true;
        Default::default()
    });
    let mut runner = rig.runner(cfg, &mut operator);

    for _ in 0..5 {
        runner.step();
        assert!(!runner.commands().launch);
    }

    // One violation per pass while the reading stays out of range.
    assert_eq!(runner.machine().total_faults(), 5);
    assert!(runner.machine().is_faulted());
    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
    assert!(runner.met().is_none());
    assert!(rig.telemetry.frames.iter().all(|f| f[1] == 1));
}

#[test]
fn faulted_pod_aborts_before_evaluating() {
    let table = "\
Label\tLow\tHigh\tSafeToApproach\tLaunching\tBrakingHigh\tCrawling\tTrigger\tFault
LVBatt_Voltage\t12\t15\t0\t0\t0\t1\t0\t0
";
    let cfg = load_config_from_strings(POD_TOML, table).unwrap();
    let mut rig = Rig::with_pod(pod().with_speed(30.0).with_brake_pressure(CHARGED_PRESSURE));
    let mut idle = IdleCommands;
    let mut runner = rig
        .runner(cfg, &mut idle)
        .with_machine(PodStateMachine::starting_in(PodState::Crawling));

    // Non-trigger violation: counted, no abort yet.
    runner.step();
    assert_eq!(runner.machine().state(), PodState::Crawling);
    assert_eq!(runner.last_eval().total_new_faults, 1);
    assert_eq!(runner.last_eval().abort, None);

    // Next pass aborts first and skips the walk.
    runner.step();
    let eval = runner.last_eval();
    assert_eq!(
        eval.abort,
        Some(AbortOutcome::Aborted {
            from: PodState::Crawling,
            to: PodState::BrakingLow
        })
    );
    assert_eq!(eval.total_new_faults, 0);
    assert_eq!(runner.machine().total_faults(), 1);
    assert_eq!(runner.machine().state(), PodState::BrakingLow);
}

#[test]
fn operator_abort_from_crawling() {
    let mut rig = Rig::with_pod(pod().with_speed(30.0).with_brake_pressure(CHARGED_PRESSURE));
    let mut sent = false;
    let mut operator = script(move |_status, _cmds| {
        if sent {
            Default::default()
        } else {
            sent = true;
            ABORT
        }
    });
    let mut runner = rig
        .runner(loaded(), &mut operator)
        .with_machine(PodStateMachine::starting_in(PodState::Crawling));

    runner.step();

    assert_eq!(runner.machine().state(), PodState::BrakingLow);
    assert!(!runner.machine().is_faulted());
    assert!(!runner.actuators().vent_closed);
    assert_eq!(runner.commands().throttle, 0.0);
}

#[test]
fn operator_abort_on_the_pad_is_ignored() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut operator = script(|_status, _cmds| ABORT);
    let mut runner = rig.runner(cfg, &mut operator);

    runner.step();
    runner.step();

    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
    assert!(!runner.machine().is_faulted());
}

#[test]
fn abort_in_braking_low_waits_for_stop() {
    let mut rig = Rig::with_pod(pod().with_speed(50.0));
    let mut operator = script(|_status, _cmds| ABORT);
    let mut runner = rig
        .runner(loaded(), &mut operator)
        .with_machine(PodStateMachine::starting_in(PodState::BrakingLow));

    runner.step();

    assert_eq!(runner.machine().state(), PodState::BrakingLow);
    assert!(runner.kinematics().speed > 1.0);
}

#[test]
fn non_finite_throttle_command_is_ignored() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut cycle = 0;
    let mut operator = script(move |_status, cmds| {
        cmds.throttle = if cycle == 0 { 0.4 } else { f64::NAN };
        cycle += 1;
        Default::default()
    });
    let mut runner = rig.runner(cfg, &mut operator);

    runner.step();
    runner.step();
    runner.step();

    assert_eq!(runner.commands().throttle, 0.4);
    assert_eq!(runner.actuators().throttle, 0.4);
    assert_eq!(rig.pod.throttle(), 0.4);
}
