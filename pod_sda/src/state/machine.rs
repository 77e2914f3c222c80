//! Pod state machine.
//!
//! Forward cycle: SafeToApproach → Launching → BrakingHigh → Crawling →
//! BrakingLow → SafeToApproach. `abort()` short-circuits toward BrakingLow.
//! Fault and Coasting are never entered; finding the machine in either is
//! fatal (force SafeToApproach, latch faulted, raise the fatal flag).

use pod_common::config::FlightParameters;
use pod_common::consts::READY_TO_LAUNCH_CODE;
use pod_common::state::PodState;
use tracing::{error, info};

/// Global fault counter and flag. Never cleared during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultAccounting {
    pub total_faults: u64,
    pub is_faulted: bool,
}

/// Result of `transition()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Advanced one step along the forward cycle.
    Advanced { from: PodState, to: PodState },
    /// Called from a state outside the cycle.
    Fatal { from: PodState },
}

/// Result of `abort()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    /// SafeToApproach: nothing to abort.
    Ignored,
    /// State changed.
    Aborted { from: PodState, to: PodState },
    /// BrakingLow with the pod still moving.
    WaitingForStop,
    /// Called from a state outside the cycle.
    Fatal { from: PodState },
}

impl AbortOutcome {
    /// True when the call changed the current state.
    #[inline]
    pub const fn changed_state(&self) -> bool {
        matches!(self, Self::Aborted { .. } | Self::Fatal { .. })
    }
}

/// Pod state plus fault accounting.
#[derive(Debug, Clone)]
pub struct PodStateMachine {
    state: PodState,
    faults: FaultAccounting,
    fatal: bool,
}

impl PodStateMachine {
    /// New machine in SafeToApproach with no faults.
    pub const fn new() -> Self {
        Self::starting_in(PodState::SafeToApproach)
    }

    /// New machine in an arbitrary state.
    pub const fn starting_in(state: PodState) -> Self {
        Self {
            state,
            faults: FaultAccounting {
                total_faults: 0,
                is_faulted: false,
            },
            fatal: false,
        }
    }

    #[inline]
    pub const fn state(&self) -> PodState {
        self.state
    }

    #[inline]
    pub const fn faults(&self) -> FaultAccounting {
        self.faults
    }

    #[inline]
    pub const fn is_faulted(&self) -> bool {
        self.faults.is_faulted
    }

    #[inline]
    pub const fn total_faults(&self) -> u64 {
        self.faults.total_faults
    }

    /// A fatal state condition occurred; the run must end.
    #[inline]
    pub const fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Advance exactly one step along the forward cycle.
    pub fn transition(&mut self) -> Transition {
        let from = self.state;
        match from.successor() {
            Some(to) => {
                self.state = to;
                info!(%from, %to, "state transition");
                Transition::Advanced { from, to }
            }
            None => {
                self.go_fatal(from);
                Transition::Fatal { from }
            }
        }
    }

    /// State-dependent abort toward a safe braking state.
    pub fn abort(&mut self, speed: f64) -> AbortOutcome {
        let from = self.state;
        let to = match from {
            PodState::SafeToApproach => return AbortOutcome::Ignored,
            PodState::Launching | PodState::BrakingHigh | PodState::Crawling => {
                PodState::BrakingLow
            }
            PodState::BrakingLow if speed > 0.0 => return AbortOutcome::WaitingForStop,
            PodState::BrakingLow => PodState::SafeToApproach,
            PodState::Fault | PodState::Coasting => {
                self.go_fatal(from);
                return AbortOutcome::Fatal { from };
            }
        };
        self.state = to;
        info!(%from, %to, speed, "abort");
        AbortOutcome::Aborted { from, to }
    }

    /// Fold one evaluation pass into the global counter.
    pub fn record_faults(&mut self, new_faults: u64) {
        self.faults.total_faults = self.faults.total_faults.saturating_add(new_faults);
        if self.faults.total_faults > 0 {
            self.faults.is_faulted = true;
        }
    }

    /// Launch gating: not faulted, HV on, brakes released and every
    /// launch parameter set.
    pub fn ready_to_launch(
        &self,
        high_voltage: bool,
        brakes_applied: bool,
        flight: &FlightParameters,
    ) -> bool {
        !self.faults.is_faulted && high_voltage && !brakes_applied && flight.all_set()
    }

    /// State byte for telemetry. SafeToApproach reports the ready code
    /// while the pod is ready to launch.
    pub fn telemetry_code(&self, ready: bool) -> u8 {
        if self.state == PodState::SafeToApproach && ready {
            READY_TO_LAUNCH_CODE
        } else {
            self.state.code()
        }
    }

    fn go_fatal(&mut self, from: PodState) {
        error!(state = %from, "invalid pod state, forcing SafeToApproach and quitting");
        self.state = PodState::SafeToApproach;
        self.faults.is_faulted = true;
        self.fatal = true;
    }
}

impl Default for PodStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
