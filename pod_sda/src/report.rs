//! Reporting root: telemetry frames, data-log lines and their send rates.

pub mod datalog;
pub mod rate;
pub mod telemetry;
