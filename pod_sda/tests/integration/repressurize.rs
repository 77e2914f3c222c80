//! Integration test: brake re-pressurization wait.
//!
//! Entered from BrakingHigh once the pod has stopped. Ends on ready
//! pressure (→ Crawling), on the 60 s timeout (→ abort), or early when
//! the state changes or quit is requested.

use std::time::Duration;

use pod_common::state::PodState;
use pod_sda::cycle::RepressurizeOutcome;
use pod_sda::io::IdleCommands;
use pod_sda::sim::physics::{CHARGED_PRESSURE, FlightSimulator};
use pod_sda::state::machine::PodStateMachine;

use super::{ABORT, QUIT, Rig, loaded, script};

fn stopped_pod() -> FlightSimulator {
    FlightSimulator::new(loaded().pod.thresholds.brake_ready_pressure)
}

fn braking_high() -> PodStateMachine {
    PodStateMachine::starting_in(PodState::BrakingHigh)
}

#[test]
fn charged_line_moves_to_crawling() {
    let mut rig = Rig::with_pod(stopped_pod());
    let mut idle = IdleCommands;
    let mut runner = rig.runner(loaded(), &mut idle).with_machine(braking_high());

    runner.step();

    assert_eq!(
        runner.last_repressurize(),
        Some(RepressurizeOutcome::Pressurized)
    );
    assert_eq!(runner.machine().state(), PodState::Crawling);
    // One cycle to open the reservoir, one to read the charged line.
    assert_eq!(runner.stats().background_cycles, 2);
    assert!(!runner.commands().reservoir_1);
    assert!(runner.commands().vent_closed);
    assert!(!runner.actuators().reservoir_1);
    assert_eq!(rig.pod.brake_pressure(), CHARGED_PRESSURE);
}

#[test]
fn leaking_line_times_out_and_aborts() {
    let mut rig = Rig::with_pod(stopped_pod().with_leaking_reservoirs());
    let mut idle = IdleCommands;
    let mut runner = rig.runner(loaded(), &mut idle).with_machine(braking_high());

    runner.step();

    assert_eq!(
        runner.last_repressurize(),
        Some(RepressurizeOutcome::TimedOut)
    );
    assert_eq!(runner.machine().state(), PodState::BrakingLow);
    // Background cycles at 0, 10 ms, ..., 60 s.
    assert_eq!(runner.stats().background_cycles, 6001);
    assert!(runner.commands().reservoir_1);
    assert!(!runner.machine().is_faulted());
    assert!(rig.clock_now() >= Duration::from_secs(60));
}

#[test]
fn timed_out_pod_settles_in_safe_to_approach() {
    let mut rig = Rig::with_pod(stopped_pod().with_leaking_reservoirs());
    let mut idle = IdleCommands;
    let mut runner = rig.runner(loaded(), &mut idle).with_machine(braking_high());

    runner.step();
    runner.step();

    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
    assert!(!runner.commands().vent_closed);
}

#[test]
fn operator_abort_interrupts_wait() {
    let mut rig = Rig::with_pod(stopped_pod().with_leaking_reservoirs());
    let mut operator = script(|status, _cmds| {
        if status.state == PodState::BrakingHigh && status.now >= Duration::from_millis(50) {
            ABORT
        } else {
            Default::default()
        }
    });
    let mut runner = rig
        .runner(loaded(), &mut operator)
        .with_machine(braking_high());

    runner.step();

    assert_eq!(
        runner.last_repressurize(),
        Some(RepressurizeOutcome::Interrupted)
    );
    assert_eq!(runner.machine().state(), PodState::BrakingLow);
    assert_eq!(runner.stats().background_cycles, 6);
}

#[test]
fn quit_interrupts_wait() {
    let mut rig = Rig::with_pod(stopped_pod().with_leaking_reservoirs());
    let mut operator = script(|status, _cmds| {
        if status.now >= Duration::from_millis(100) {
            QUIT
        } else {
            Default::default()
        }
    });
    let mut runner = rig
        .runner(loaded(), &mut operator)
        .with_machine(braking_high());

    let stats = runner.run();

    assert_eq!(
        runner.last_repressurize(),
        Some(RepressurizeOutcome::Interrupted)
    );
    assert!(runner.should_quit());
    assert_eq!(runner.machine().state(), PodState::BrakingHigh);
    assert_eq!(stats.cycles, 1);
}

#[test]
fn moving_pod_keeps_venting() {
    let mut rig = Rig::with_pod(stopped_pod().with_speed(50.0));
    let mut idle = IdleCommands;
    let mut runner = rig.runner(loaded(), &mut idle).with_machine(braking_high());

    runner.step();

    assert_eq!(runner.machine().state(), PodState::BrakingHigh);
    assert_eq!(runner.last_repressurize(), None);
    assert!(!runner.commands().vent_closed);
    assert_eq!(runner.commands().throttle, 0.0);
    assert!(!runner.actuators().vent_closed);
}
