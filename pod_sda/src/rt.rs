//! Real-time setup for the flight computer.
//!
//! The SDA cycle thread locks its memory, pins itself to one core and runs
//! under SCHED_FIFO. The system calls are compiled in only with the `rt`
//! feature; without it `apply` checks the profile and returns.

use core::fmt;
use std::io;

#[cfg(not(feature = "rt"))]
use tracing::debug;
#[cfg(feature = "rt")]
use tracing::info;

use crate::error::SdaError;

/// Valid SCHED_FIFO priorities on Linux.
pub const FIFO_PRIORITY_RANGE: core::ops::RangeInclusive<i32> = 1..=99;

/// Which part of the setup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtStep {
    LockMemory,
    PinCore,
    Scheduler,
}

impl fmt::Display for RtStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LockMemory => "mlockall",
            Self::PinCore => "cpu affinity",
            Self::Scheduler => "SCHED_FIFO",
        })
    }
}

/// Core and priority the cycle thread runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtProfile {
    pub cpu_core: usize,
    pub priority: i32,
}

impl RtProfile {
    /// Check the profile, then lock memory, pin and raise the calling thread.
    pub fn apply(&self) -> Result<(), SdaError> {
        if !FIFO_PRIORITY_RANGE.contains(&self.priority) {
            return Err(failed(
                RtStep::Scheduler,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("priority {} outside 1..=99", self.priority),
                ),
            ));
        }

        #[cfg(feature = "rt")]
        {
            self.lock_memory()?;
            self.pin_core()?;
            self.raise_priority()?;
            info!(cpu_core = self.cpu_core, priority = self.priority, "real-time setup applied");
        }

        #[cfg(not(feature = "rt"))]
        {
            debug!(?self, "built without the rt feature, running best-effort");
        }

        Ok(())
    }

    #[cfg(feature = "rt")]
    fn lock_memory(&self) -> Result<(), SdaError> {
        use nix::sys::mman::{MlockallFlags, mlockall};
        mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
            .map_err(|e| failed(RtStep::LockMemory, e.into()))
    }

    #[cfg(feature = "rt")]
    fn pin_core(&self) -> Result<(), SdaError> {
        use nix::sched::{CpuSet, sched_setaffinity};
        use nix::unistd::Pid;

        let mut cores = CpuSet::new();
        cores
            .set(self.cpu_core)
            .and_then(|()| sched_setaffinity(Pid::from_raw(0), &cores))
            .map_err(|e| failed(RtStep::PinCore, e.into()))
    }

    #[cfg(feature = "rt")]
    fn raise_priority(&self) -> Result<(), SdaError> {
        let param = libc::sched_param {
            sched_priority: self.priority,
        };
        // SAFETY: pid 0 is the calling thread and `param` lives across the call.
        if unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) } != 0 {
            return Err(failed(RtStep::Scheduler, io::Error::last_os_error()));
        }
        Ok(())
    }
}

fn failed(step: RtStep, source: io::Error) -> SdaError {
    SdaError::RtSetup { step, source }
}
