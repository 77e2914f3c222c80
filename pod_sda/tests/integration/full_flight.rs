//! Integration test: complete simulated flight and reporting cadence.
//!
//! Arm → launch → high-speed braking → re-pressurize → crawl → operator
//! abort → final braking → SafeToApproach, flown by the autopilot on
//! simulated time.

use std::collections::BTreeSet;
use std::time::Duration;

use pod_common::consts::TELEMETRY_FRAME_LEN;
use pod_common::sensor::SensorKey;
use pod_common::state::PodState;
use pod_sda::cycle::RepressurizeOutcome;
use pod_sda::io::IdleCommands;
use pod_sda::sim::autopilot::{AutoPilot, Phase};

use super::{Rig, loaded};

const RUN_CAP: Duration = Duration::from_secs(300);

#[test]
fn autopilot_flies_full_profile() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut pilot = AutoPilot::new(30.0);

    let mut runner = rig.runner(cfg, &mut pilot).with_deadline(RUN_CAP);
    let stats = runner.run();

    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
    assert!(!runner.machine().is_faulted());
    assert!(!runner.machine().is_fatal());
    assert_eq!(runner.machine().total_faults(), 0);
    assert_eq!(
        runner.last_repressurize(),
        Some(RepressurizeOutcome::Pressurized)
    );
    assert!(stats.background_cycles >= 2);
    assert!(!runner.commands().launch);
    assert!(runner.met().is_some());
    assert_eq!(pilot.phase(), Phase::Finished);

    // Finished on the autopilot's quit, well before the cap.
    assert!(rig.clock_now() < RUN_CAP);
    assert!(rig.pod.distance() > 500.0);
    assert!(rig.pod.speed() < 1.0);
    assert!(rig.pod.brakes_applied());

    let states: BTreeSet<u8> = rig.telemetry.frames.iter().map(|f| f[1]).collect();
    for state in [
        PodState::SafeToApproach,
        PodState::Launching,
        PodState::BrakingHigh,
        PodState::Crawling,
        PodState::BrakingLow,
    ] {
        assert!(states.contains(&state.code()), "no frame in {state}");
    }
    assert!(
        rig.telemetry
            .frames
            .iter()
            .all(|f| f.len() == TELEMETRY_FRAME_LEN && f[0] == 69)
    );
}

#[test]
fn launch_waits_for_brake_release() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut pilot = AutoPilot::new(30.0);
    let mut runner = rig.runner(cfg, &mut pilot);

    // First cycle: HV requested but the brake line is still empty.
    runner.step();
    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
    assert!(runner.actuators().high_voltage);
    assert!(runner.actuators().reservoir_1);

    // Second cycle: line charged, ready, launched.
    runner.step();
    assert!(!runner.kinematics().brakes_applied);
    assert_eq!(runner.machine().state(), PodState::Launching);
    assert!(!runner.commands().launch);
}

#[test]
fn telemetry_and_log_follow_configured_rates() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    let mut idle = IdleCommands;

    let mut runner = rig
        .runner(cfg, &mut idle)
        .with_deadline(Duration::from_secs(1));
    let stats = runner.run();

    // Cycles at 0, 10, ..., 1000 ms.
    assert_eq!(stats.cycles, 101);
    // 20 Hz telemetry, 10 Hz log.
    assert_eq!(stats.telemetry_sent, 21);
    assert_eq!(stats.log_writes, 11);
    assert_eq!(rig.telemetry.frames.len(), 21);
    assert_eq!(rig.log.writes, 11);
    assert_eq!(rig.log.lines.len(), 11 * SensorKey::COUNT);

    let frame = &rig.telemetry.frames[0];
    assert_eq!(frame[0], 69);
    assert_eq!(frame[1], PodState::SafeToApproach.code());
}

#[test]
fn failed_telemetry_is_retried_every_cycle() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    rig.telemetry.fail = true;
    let mut idle = IdleCommands;

    let mut runner = rig
        .runner(cfg, &mut idle)
        .with_deadline(Duration::from_secs(1));
    let stats = runner.run();

    assert_eq!(stats.telemetry_sent, 0);
    assert_eq!(stats.telemetry_dropped, stats.cycles);
    // The log is unaffected.
    assert_eq!(stats.log_writes, 11);
    assert_eq!(runner.machine().state(), PodState::SafeToApproach);
}

#[test]
fn failed_log_writes_do_not_stop_the_cycle() {
    let cfg = loaded();
    let mut rig = Rig::new(&cfg);
    rig.log.fail = true;
    let mut idle = IdleCommands;

    let mut runner = rig
        .runner(cfg, &mut idle)
        .with_deadline(Duration::from_secs(1));
    let stats = runner.run();

    assert_eq!(stats.cycles, 101);
    assert_eq!(stats.log_writes, 0);
    assert_eq!(stats.log_dropped, stats.cycles);
    assert_eq!(stats.telemetry_sent, 21);
    assert!(rig.log.lines.is_empty());
}
