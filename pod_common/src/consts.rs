//! System-wide constants for the pod workspace.
//!
//! Single source of truth for wire-format sizes and configuration defaults.

use static_assertions::const_assert_eq;

/// Length of one telemetry datagram [bytes].
pub const TELEMETRY_FRAME_LEN: usize = 34;

// u8 team · u8 state · 3×i32 kinematics · 4×i32 reserved · u32 odometer
const_assert_eq!(TELEMETRY_FRAME_LEN, 1 + 1 + 3 * 4 + 4 * 4 + 4);

/// Optical stripes counted per odometer unit reported in telemetry.
pub const STRIPES_PER_ODOMETER_UNIT: u32 = 3048;

/// Telemetry code reported while in SafeToApproach and ready to launch.
pub const READY_TO_LAUNCH_CODE: u8 = 2;

/// Default team identifier sent in every telemetry frame.
pub const DEFAULT_TEAM_ID: u8 = 69;

/// Default telemetry endpoint.
pub const DEFAULT_TELEMETRY_ENDPOINT: &str = "192.168.0.1:3000";

/// Default telemetry send rate [Hz].
pub const DEFAULT_TELEMETRY_RATE_HZ: f64 = 40.0;

/// Default log write rate [Hz].
pub const DEFAULT_LOG_RATE_HZ: f64 = 10.0;

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default abort-range table file name.
pub const DEFAULT_ABORT_TABLE: &str = "abortranges.dat";

/// Brake line pressure at which pneumatic brakes are released [psi].
pub const DEFAULT_BRAKE_READY_PRESSURE: f64 = 177.0;

/// Speed below which high-speed braking reconfigures for crawling [ft/s].
pub const DEFAULT_BRAKING_STOP_SPEED: f64 = 0.5;

/// Speed below which final braking is considered stopped [ft/s].
pub const DEFAULT_FINAL_STOP_SPEED: f64 = 1.0;

/// Upper bound on the brake re-pressurization wait [s].
pub const DEFAULT_REPRESSURIZE_TIMEOUT_S: f64 = 60.0;

/// Default crawl speed [ft/s].
pub const DEFAULT_CRAWL_SPEED: f64 = 30.0;

/// Default sensor poll interval [ms].
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;
