//! Cycle orchestrator.
//!
//! ## Outer cycle
//! poll sensors → operator commands → threshold evaluation → run-state
//! logic → command mediation → telemetry and data log. Then sleep one poll
//! interval on the injected clock. The loop ends exactly when the quit flag
//! is set.
//!
//! ## Re-pressurization wait
//! Entered from BrakingHigh once the pod has stopped. A nested loop that
//! keeps running the background cycle (poll, operator, mediation,
//! evaluation, reporting) until brake pressure is ready, the timeout
//! expires, the state changes under it, or quit is requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pod_common::command::{ActuatorState, CommandVector};
use pod_common::config::PodConfig;
use pod_common::sensor::{SensorKey, SensorSnapshot};
use pod_common::state::PodState;
use tracing::{debug, info, warn};

use crate::command::mediator;
use crate::config::LoadedConfig;
use crate::io::{Clock, CommandSource, LogSink, PodIo, StatusView, TelemetryTransport};
use crate::report::rate::RateLimiter;
use crate::report::{datalog, telemetry};
use crate::safety::evaluator::{self, EvalResult};
use crate::safety::registry::AbortRegistry;
use crate::state::kinematics::Kinematics;
use crate::state::machine::PodStateMachine;

/// Throttle change per cycle while tracking a target.
pub const THROTTLE_STEP: f64 = 0.01;

/// Relative dead band around the throttle target.
pub const THROTTLE_BAND: f64 = 0.02;

/// Step `throttle` so that `measured` tracks `target` within the band.
pub fn step_throttle(throttle: f64, measured: f64, target: f64) -> f64 {
    let next = if measured < target * (1.0 - THROTTLE_BAND) {
        throttle + THROTTLE_STEP
    } else if measured > target * (1.0 + THROTTLE_BAND) {
        throttle - THROTTLE_STEP
    } else {
        throttle
    };
    next.clamp(0.0, 1.0)
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Counters kept across the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Outer cycles executed.
    pub cycles: u64,
    /// Background cycles executed inside the re-pressurization wait.
    pub background_cycles: u64,
    pub telemetry_sent: u64,
    pub telemetry_dropped: u64,
    pub log_writes: u64,
    pub log_dropped: u64,
}

/// How a re-pressurization wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepressurizeOutcome {
    /// Pressure reached the ready threshold; transitioned to Crawling.
    Pressurized,
    /// Timed out; reservoir 1 re-requested and abort invoked.
    TimedOut,
    /// State changed underneath the wait, or quit was requested.
    Interrupted,
}

// ─── Collaborators ──────────────────────────────────────────────────

/// External collaborators, borrowed for the duration of the run.
pub struct Collaborators<'a> {
    pub pod: &'a mut dyn PodIo,
    pub commands: &'a mut dyn CommandSource,
    pub telemetry: &'a mut dyn TelemetryTransport,
    pub log: &'a mut dyn LogSink,
    pub clock: &'a mut dyn Clock,
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns the pod context for one run and drives the collaborators.
pub struct CycleRunner<'a> {
    config: PodConfig,
    io: Collaborators<'a>,
    registry: AbortRegistry,
    machine: PodStateMachine,
    commands: CommandVector,
    actuators: ActuatorState,
    kinematics: Kinematics,
    snapshot: SensorSnapshot,
    telemetry_rate: RateLimiter,
    log_rate: RateLimiter,
    poll_interval: Duration,
    met_start: Option<Duration>,
    deadline: Option<Duration>,
    quit: Arc<AtomicBool>,
    stats: CycleStats,
    last_eval: EvalResult,
    last_repressurize: Option<RepressurizeOutcome>,
}

impl<'a> CycleRunner<'a> {
    /// Build the runner. The initial command vector comes from the
    /// configuration's command table.
    pub fn new(loaded: LoadedConfig, io: Collaborators<'a>, quit: Arc<AtomicBool>) -> Self {
        let LoadedConfig { pod, abort_table } = loaded;
        let registry = AbortRegistry::from_table(&abort_table);
        info!(
            pod = io.pod.name(),
            entries = registry.len(),
            "cycle runner initialized"
        );

        Self {
            registry,
            machine: PodStateMachine::new(),
            commands: pod.commands,
            actuators: ActuatorState::default(),
            kinematics: Kinematics::default(),
            snapshot: SensorSnapshot::empty(),
            telemetry_rate: RateLimiter::from_hz(pod.telemetry.rate_hz),
            log_rate: RateLimiter::from_hz(pod.log.rate_hz),
            poll_interval: pod.cycle.poll_interval(),
            met_start: None,
            deadline: None,
            quit,
            stats: CycleStats::default(),
            last_eval: EvalResult::default(),
            last_repressurize: None,
            config: pod,
            io,
        }
    }

    /// Replace the state machine (start in a given state or with faults).
    pub fn with_machine(mut self, machine: PodStateMachine) -> Self {
        self.machine = machine;
        self
    }

    /// Request quit once the clock reaches `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn machine(&self) -> &PodStateMachine {
        &self.machine
    }

    pub fn registry(&self) -> &AbortRegistry {
        &self.registry
    }

    pub fn commands(&self) -> &CommandVector {
        &self.commands
    }

    pub fn actuators(&self) -> &ActuatorState {
        &self.actuators
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn last_eval(&self) -> EvalResult {
        self.last_eval
    }

    pub fn last_repressurize(&self) -> Option<RepressurizeOutcome> {
        self.last_repressurize
    }

    /// Mission elapsed time, `None` before launch.
    pub fn met(&self) -> Option<Duration> {
        self.met_start
            .map(|start| self.io.clock.now().saturating_sub(start))
    }

    #[inline]
    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    /// Run outer cycles until the quit flag is set.
    pub fn run(&mut self) -> CycleStats {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            state = %self.machine.state(),
            "entering cycle loop"
        );

        while !self.should_quit() {
            self.step();

            if let Some(deadline) = self.deadline {
                if self.io.clock.now() >= deadline {
                    info!(?deadline, "run deadline reached");
                    self.quit.store(true, Ordering::SeqCst);
                }
            }

            self.io.clock.sleep(self.poll_interval);
        }

        info!(
            cycles = self.stats.cycles,
            state = %self.machine.state(),
            total_faults = self.machine.total_faults(),
            "cycle loop finished"
        );
        self.stats
    }

    /// One outer cycle.
    pub fn step(&mut self) {
        self.poll_sensors();
        self.poll_operator();
        self.evaluate();
        self.run_state();
        self.mediate();
        self.report();
        self.check_fatal();
        self.stats.cycles += 1;
    }

    /// One background cycle, as run inside the re-pressurization wait.
    fn background_cycle(&mut self) {
        self.poll_sensors();
        self.poll_operator();
        self.mediate();
        self.evaluate();
        self.report();
        self.check_fatal();
        self.stats.background_cycles += 1;
    }

    fn poll_sensors(&mut self) {
        let now = self.io.clock.now();
        self.snapshot = self.io.pod.poll(now);
        self.kinematics
            .update(&self.snapshot, self.config.thresholds.brake_ready_pressure);
    }

    fn ready_to_launch(&self) -> bool {
        self.machine.ready_to_launch(
            self.actuators.high_voltage,
            self.kinematics.brakes_applied,
            &self.config.flight,
        )
    }

    fn status(&self) -> StatusView {
        StatusView {
            state: self.machine.state(),
            faulted: self.machine.is_faulted(),
            total_faults: self.machine.total_faults(),
            ready_to_launch: self.ready_to_launch(),
            kinematics: self.kinematics,
            brake_pressure: self.snapshot.get(SensorKey::BrakePressure),
            met: self.met(),
            now: self.io.clock.now(),
            log_failures: self.stats.log_dropped,
        }
    }

    fn poll_operator(&mut self) {
        let status = self.status();
        let previous_throttle = self.commands.throttle;
        let request = self.io.commands.poll(&status, &mut self.commands);
        if !self.commands.throttle.is_finite() {
            warn!(
                throttle = self.commands.throttle,
                "non-finite throttle command ignored"
            );
            self.commands.throttle = previous_throttle;
        }
        if request.abort {
            let outcome = self.machine.abort(self.kinematics.speed);
            info!(?outcome, "operator abort");
        }
        if request.quit {
            info!("operator quit");
            self.quit.store(true, Ordering::SeqCst);
        }
    }

    fn evaluate(&mut self) {
        self.last_eval = evaluator::evaluate(
            &mut self.registry,
            &mut self.machine,
            &self.snapshot,
            self.kinematics.speed,
        );
    }

    fn mediate(&mut self) {
        for intent in mediator::apply(&self.commands, &mut self.actuators) {
            debug!(?intent, "actuate");
            self.io.pod.actuate(intent);
        }
    }

    fn report(&mut self) {
        let now = self.io.clock.now();

        if self.telemetry_rate.ready(now) {
            let code = self.machine.telemetry_code(self.ready_to_launch());
            let frame = telemetry::TelemetryFrame::from_kinematics(
                self.config.telemetry.team_id,
                code,
                &self.kinematics,
            );
            match self.io.telemetry.send(&telemetry::encode(&frame)) {
                Ok(()) => {
                    self.telemetry_rate.mark(now);
                    self.stats.telemetry_sent += 1;
                }
                Err(e) => {
                    self.stats.telemetry_dropped += 1;
                    warn!(error = %e, "telemetry send failed, frame dropped");
                }
            }
        }

        if self.log_rate.ready(now) {
            let lines = datalog::encode(&self.snapshot, &self.registry, self.machine.state(), now);
            match self.io.log.write_lines(&lines) {
                Ok(()) => {
                    self.log_rate.mark(now);
                    self.stats.log_writes += 1;
                }
                Err(e) => {
                    self.stats.log_dropped += 1;
                    warn!(error = %e, "log write failed, lines dropped");
                }
            }
        }
    }

    fn check_fatal(&mut self) {
        if self.machine.is_fatal() && !self.should_quit() {
            self.quit.store(true, Ordering::SeqCst);
        }
    }

    // ─── Run-state logic ────────────────────────────────────────────

    fn run_state(&mut self) {
        let k = self.kinematics;
        match self.machine.state() {
            PodState::SafeToApproach => {
                if self.commands.launch {
                    self.commands.launch = false;
                    if self.machine.is_faulted() {
                        warn!("cannot launch, pod in fault state");
                    } else {
                        self.met_start = Some(self.io.clock.now());
                        info!("launch");
                        self.machine.transition();
                    }
                }
            }
            PodState::Launching => {
                if self.met_start.is_none() {
                    self.met_start = Some(self.io.clock.now());
                }
                let flight = self.config.flight;
                self.commands.throttle =
                    step_throttle(self.commands.throttle, k.accel, flight.max_accel);

                let met = self.met().unwrap_or_default().as_secs_f64();
                if k.distance >= flight.begin_braking_distance
                    || k.speed >= flight.max_speed
                    || met >= flight.max_time
                {
                    info!(
                        distance = k.distance,
                        speed = k.speed,
                        met,
                        "launch complete, braking"
                    );
                    self.machine.transition();
                }
            }
            PodState::BrakingHigh => {
                self.commands.vent_closed = false;
                self.commands.throttle = 0.0;
                if k.speed < self.config.thresholds.braking_stop_speed {
                    self.commands.vent_closed = true;
                    self.commands.reservoir_1 = true;
                    let outcome = self.repressurize();
                    self.last_repressurize = Some(outcome);
                }
            }
            PodState::Crawling => {
                self.commands.throttle =
                    step_throttle(self.commands.throttle, k.speed, self.config.flight.crawl_speed);
            }
            PodState::BrakingLow => {
                self.commands.throttle = 0.0;
                self.commands.vent_closed = false;
                if k.speed < self.config.thresholds.final_stop_speed {
                    info!(speed = k.speed, "pod stopped");
                    self.machine.transition();
                }
            }
            PodState::Fault | PodState::Coasting => {
                // Never entered by normal transitions.
                self.machine.transition();
            }
        }
    }

    /// Wait for the brakes to re-pressurize from reservoir 1.
    fn repressurize(&mut self) -> RepressurizeOutcome {
        let start = self.io.clock.now();
        let timeout = self.config.thresholds.repressurize_timeout();
        let ready = self.config.thresholds.brake_ready_pressure;
        info!(?timeout, ready, "re-pressurizing brakes");

        loop {
            self.background_cycle();

            if self.machine.state() != PodState::BrakingHigh || self.should_quit() {
                info!(state = %self.machine.state(), "re-pressurization interrupted");
                return RepressurizeOutcome::Interrupted;
            }

            if self
                .snapshot
                .get(SensorKey::BrakePressure)
                .is_some_and(|p| p >= ready)
            {
                self.commands.reservoir_1 = false;
                self.machine.transition();
                return RepressurizeOutcome::Pressurized;
            }

            if self.io.clock.now().saturating_sub(start) >= timeout {
                warn!(?timeout, "re-pressurization timed out, aborting");
                self.commands.reservoir_1 = true;
                self.machine.abort(self.kinematics.speed);
                return RepressurizeOutcome::TimedOut;
            }

            self.io.clock.sleep(self.poll_interval);
        }
    }
}
