//! Data-log line encoder.
//!
//! One tab-delimited line per present reading:
//! `key \t value \t fault \t seconds`, where `fault` is 1 when the active
//! state's entry for that key has latched.

use core::fmt;
use std::time::Duration;

use pod_common::sensor::{SensorKey, SensorSnapshot};
use pod_common::state::PodState;

use crate::safety::registry::AbortRegistry;

/// One log row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRecord {
    pub key: SensorKey,
    pub value: f64,
    pub fault: u8,
    /// Seconds since run start.
    pub timestamp: f64,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{:.6}",
            self.key, self.value, self.fault, self.timestamp
        )
    }
}

/// Records for every present reading, in key order.
pub fn records<'a>(
    snapshot: &'a SensorSnapshot,
    registry: &'a AbortRegistry,
    state: PodState,
    now: Duration,
) -> impl Iterator<Item = LogRecord> + 'a {
    let timestamp = now.as_secs_f64();
    snapshot.iter().map(move |(key, value)| LogRecord {
        key,
        value,
        fault: u8::from(registry.is_faulted(state, key)),
        timestamp,
    })
}

/// Encode the snapshot as log lines.
pub fn encode(
    snapshot: &SensorSnapshot,
    registry: &AbortRegistry,
    state: PodState,
    now: Duration,
) -> Vec<String> {
    records(snapshot, registry, state, now)
        .map(|r| r.to_string())
        .collect()
}
