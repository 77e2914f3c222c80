//! Prelude module for common re-exports.
//!
//! ```rust
//! use pod_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, CycleConfig, FlightParameters, LogConfig, PodConfig,
    TelemetryConfig, Thresholds,
};

// ─── Abort Ranges ───────────────────────────────────────────────────
pub use crate::abort::{AbortRangeEntry, AbortRow, AbortTable, MonitoredStates};

// ─── Commands ───────────────────────────────────────────────────────
pub use crate::command::{ActuatorIntent, ActuatorSlot, ActuatorState, CommandVector};

// ─── State / Sensors ────────────────────────────────────────────────
pub use crate::sensor::{SensorKey, SensorSnapshot};
pub use crate::state::PodState;

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{READY_TO_LAUNCH_CODE, TELEMETRY_FRAME_LEN};

/// Default cycle sleep as a `Duration`.
pub const DEFAULT_POLL_INTERVAL: Duration =
    Duration::from_millis(crate::consts::DEFAULT_POLL_INTERVAL_MS);
