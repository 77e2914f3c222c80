//! Shared rig for the integration tests.

mod abort_paths;
mod full_flight;
mod repressurize;
mod startup;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use pod_common::command::CommandVector;
use pod_sda::config::{LoadedConfig, load_config_from_strings};
use pod_sda::cycle::{Collaborators, CycleRunner};
use pod_sda::io::{
    Clock, CommandSource, ManualClock, MemoryLogSink, MemoryTransport, OperatorRequest, StatusView,
};
use pod_sda::sim::physics::FlightSimulator;

pub const POD_TOML: &str = r#"
[flight]
begin_braking_distance = 500.0
max_accel = 1.0
max_speed = 200.0
max_time = 15.0
crawl_speed = 30.0

[telemetry]
endpoint = "127.0.0.1:3000"
rate_hz = 20.0

[log]
rate_hz = 10.0

[cycle]
poll_interval_ms = 10
"#;

pub const ABORT_TABLE: &str = "\
Label\tLow\tHigh\tSafeToApproach\tLaunching\tBrakingHigh\tCrawling\tTrigger\tFault
LVBatt_Voltage\t10\t15\t1\t1\t1\t1\t0\t0
IMU1_X\t-6\t2\t1\t1\t1\t1\t0\t0
Brake_Pressure\t150\t250\t0\t1\t0\t1\t1\t0
";

pub fn loaded() -> LoadedConfig {
    load_config_from_strings(POD_TOML, ABORT_TABLE).unwrap()
}

/// Simulated pod plus in-memory collaborators.
pub struct Rig {
    pub pod: FlightSimulator,
    pub telemetry: MemoryTransport,
    pub log: MemoryLogSink,
    pub clock: ManualClock,
    pub quit: Arc<AtomicBool>,
}

impl Rig {
    pub fn new(loaded: &LoadedConfig) -> Self {
        Self::with_pod(FlightSimulator::new(
            loaded.pod.thresholds.brake_ready_pressure,
        ))
    }

    pub fn with_pod(pod: FlightSimulator) -> Self {
        Self {
            pod,
            telemetry: MemoryTransport::default(),
            log: MemoryLogSink::default(),
            clock: ManualClock::new(),
            quit: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn clock_now(&self) -> Duration {
        self.clock.now()
    }

    pub fn runner<'a>(
        &'a mut self,
        loaded: LoadedConfig,
        commands: &'a mut dyn CommandSource,
    ) -> CycleRunner<'a> {
        let io = Collaborators {
            pod: &mut self.pod,
            commands,
            telemetry: &mut self.telemetry,
            log: &mut self.log,
            clock: &mut self.clock,
        };
        CycleRunner::new(loaded, io, self.quit.clone())
    }
}

/// Command source backed by a closure.
pub struct Scripted<F>(F);

pub fn script<F>(f: F) -> Scripted<F>
where
    F: FnMut(&StatusView, &mut CommandVector) -> OperatorRequest,
{
    Scripted(f)
}

impl<F> CommandSource for Scripted<F>
where
    F: FnMut(&StatusView, &mut CommandVector) -> OperatorRequest,
{
    fn poll(&mut self, status: &StatusView, commands: &mut CommandVector) -> OperatorRequest {
        (self.0)(status, commands)
    }
}

pub const ABORT: OperatorRequest = OperatorRequest {
    abort: true,
    quit: false,
};

pub const QUIT: OperatorRequest = OperatorRequest {
    abort: false,
    quit: true,
};
