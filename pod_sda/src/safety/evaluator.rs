//! Threshold evaluator.
//!
//! Checks the snapshot against the abort ranges of the current state:
//!
//! 1. Already faulted → `abort()` first. If that changed the state, the pass
//!    ends with no new faults.
//! 2. Walk the current state's entries in table order. Absent readings are
//!    skipped. A reading outside `[low, high]` latches the entry's fault bit
//!    and counts one new fault. A trigger entry aborts and ends the pass.
//! 3. New faults are folded into the global counter.
//!
//! Faults are not deduplicated: the same out-of-range reading counts again
//! on every pass.

use pod_common::sensor::SensorSnapshot;
use tracing::warn;

use super::registry::AbortRegistry;
use crate::state::machine::{AbortOutcome, PodStateMachine};

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalResult {
    /// Violations counted this pass.
    pub total_new_faults: u64,
    /// A trigger entry fired.
    pub triggered: bool,
    /// Abort invoked during this pass, if any.
    pub abort: Option<AbortOutcome>,
}

/// Run one evaluation pass.
pub fn evaluate(
    registry: &mut AbortRegistry,
    machine: &mut PodStateMachine,
    snapshot: &SensorSnapshot,
    speed: f64,
) -> EvalResult {
    let mut result = EvalResult::default();

    if machine.is_faulted() {
        let outcome = machine.abort(speed);
        result.abort = Some(outcome);
        if outcome.changed_state() {
            return result;
        }
    }

    let state = machine.state();
    for (key, entry) in registry.entries_for_mut(state) {
        let Some(value) = snapshot.get(key) else {
            continue;
        };
        if !entry.violated(value) {
            continue;
        }

        entry.fault = true;
        result.total_new_faults += 1;
        warn!(
            %state,
            sensor = %key,
            value,
            low = entry.low,
            high = entry.high,
            trigger = entry.trigger,
            "abort range violated"
        );

        if entry.trigger {
            result.triggered = true;
            result.abort = Some(machine.abort(speed));
            break;
        }
    }

    machine.record_faults(result.total_new_faults);
    result
}
