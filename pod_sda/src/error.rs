//! Startup and runtime error type.
//!
//! Safety conditions are not errors. Aborts, faults and fatal state
//! conditions surface as state outcomes plus the faulted/quit flags.

use pod_common::config::ConfigError;
use pod_common::state::PodState;
use thiserror::Error;

use crate::rt::RtStep;

#[derive(Debug, Error)]
pub enum SdaError {
    /// Configuration or abort table failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Log directory, log file or telemetry socket could not be opened.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SIGINT handler installation failed.
    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// Memory lock, core pinning or scheduler setup failed.
    #[error("RT setup failed at {step}: {source}")]
    RtSetup {
        step: RtStep,
        #[source]
        source: std::io::Error,
    },

    /// The run ended on an invalid pod state.
    #[error("fatal pod state condition, run ended in {0}")]
    Fatal(PodState),
}
