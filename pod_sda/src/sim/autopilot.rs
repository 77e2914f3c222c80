//! Scripted command source for simulated flights.
//!
//! Arms the pod (HV on, vent closed, reservoir 1 open, coolant pump on),
//! launches as soon as the pod reports ready, aborts after crawling a set
//! distance, and quits once the pod is back in SafeToApproach.

use pod_common::command::CommandVector;
use pod_common::state::PodState;
use tracing::{info, warn};

use crate::io::{CommandSource, OperatorRequest, StatusView};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Arming,
    Flying,
    Crawling { start_distance: f64 },
    Stopping,
    Finished,
}

#[derive(Debug, Clone)]
pub struct AutoPilot {
    phase: Phase,
    crawl_distance: f64,
}

impl AutoPilot {
    /// Abort after crawling `crawl_distance` feet.
    pub fn new(crawl_distance: f64) -> Self {
        Self {
            phase: Phase::Arming,
            crawl_distance,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn finish(&mut self, reason: &str) -> OperatorRequest {
        info!(reason, "autopilot finished");
        self.phase = Phase::Finished;
        OperatorRequest {
            abort: false,
            quit: true,
        }
    }
}

impl CommandSource for AutoPilot {
    fn poll(&mut self, status: &StatusView, commands: &mut CommandVector) -> OperatorRequest {
        let back_home = status.state == PodState::SafeToApproach && !commands.launch;

        match self.phase {
            Phase::Arming => {
                if status.faulted {
                    warn!(total_faults = status.total_faults, "pod faulted before launch");
                    return self.finish("faulted on the pad");
                }
                commands.high_voltage = true;
                commands.vent_closed = true;
                commands.reservoir_1 = true;
                commands.coolant_pump = true;
                if status.ready_to_launch && status.state == PodState::SafeToApproach {
                    info!("autopilot: launch");
                    commands.launch = true;
                    self.phase = Phase::Flying;
                }
                OperatorRequest::default()
            }
            Phase::Flying => {
                if status.state == PodState::Crawling {
                    self.phase = Phase::Crawling {
                        start_distance: status.kinematics.distance,
                    };
                    OperatorRequest::default()
                } else if back_home {
                    self.finish("flight ended before crawling")
                } else {
                    OperatorRequest::default()
                }
            }
            Phase::Crawling { start_distance } => {
                if status.state != PodState::Crawling {
                    self.phase = Phase::Stopping;
                    return OperatorRequest::default();
                }
                if status.kinematics.distance - start_distance >= self.crawl_distance {
                    info!(distance = status.kinematics.distance, "autopilot: crawl complete, abort");
                    self.phase = Phase::Stopping;
                    return OperatorRequest {
                        abort: true,
                        quit: false,
                    };
                }
                OperatorRequest::default()
            }
            Phase::Stopping => {
                if back_home {
                    self.finish("pod back in SafeToApproach")
                } else {
                    OperatorRequest::default()
                }
            }
            Phase::Finished => OperatorRequest {
                abort: false,
                quit: true,
            },
        }
    }
}
