//! Pod state codes.
//!
//! `#[repr(u8)]` so the code doubles as the telemetry state byte.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Operating phase of the pod.
///
/// The forward cycle is `SafeToApproach → Launching → BrakingHigh → Crawling
/// → BrakingLow → SafeToApproach`. `Fault` and `Coasting` are never entered
/// by normal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PodState {
    /// Unrecoverable fault.
    Fault = 0,
    /// Standby, safe for personnel.
    SafeToApproach = 1,
    /// Accelerating toward top speed.
    Launching = 3,
    /// Reserved, unused.
    Coasting = 4,
    /// Pneumatic braking from high speed.
    BrakingHigh = 5,
    /// Low-speed drive after re-pressurizing the brakes.
    Crawling = 6,
    /// Final braking.
    BrakingLow = 7,
}

impl PodState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Fault),
            1 => Some(Self::SafeToApproach),
            3 => Some(Self::Launching),
            4 => Some(Self::Coasting),
            5 => Some(Self::BrakingHigh),
            6 => Some(Self::Crawling),
            7 => Some(Self::BrakingLow),
            _ => None,
        }
    }

    /// Raw state code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Next state on the forward cycle, `None` for states outside it.
    #[inline]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::SafeToApproach => Some(Self::Launching),
            Self::Launching => Some(Self::BrakingHigh),
            Self::BrakingHigh => Some(Self::Crawling),
            Self::Crawling => Some(Self::BrakingLow),
            Self::BrakingLow => Some(Self::SafeToApproach),
            Self::Fault | Self::Coasting => None,
        }
    }

    /// States that can carry abort-range entries.
    pub const MONITORED: [PodState; 4] = [
        Self::SafeToApproach,
        Self::Launching,
        Self::BrakingHigh,
        Self::Crawling,
    ];
}

impl Default for PodState {
    fn default() -> Self {
        Self::SafeToApproach
    }
}

impl fmt::Display for PodState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fault => "Fault",
            Self::SafeToApproach => "SafeToApproach",
            Self::Launching => "Launching",
            Self::Coasting => "Coasting",
            Self::BrakingHigh => "BrakingHigh",
            Self::Crawling => "Crawling",
            Self::BrakingLow => "BrakingLow",
        };
        write!(f, "{name}({})", self.code())
    }
}
