//! Telemetry frame encoder.
//!
//! ```text
//! offset  size  field
//!      0     1  team id
//!      1     1  state code
//!      2     4  accel     i32
//!      6     4  distance  i32
//!     10     4  speed     i32
//!     14    16  reserved  4 × i32 zero
//!     30     4  odometer  u32 = stripe_count / 3048
//! ```
//!
//! All multi-byte fields are big-endian.

use pod_common::consts::{STRIPES_PER_ODOMETER_UNIT, TELEMETRY_FRAME_LEN};

use crate::state::kinematics::Kinematics;

/// One telemetry datagram, built and consumed within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    pub team_id: u8,
    pub state_code: u8,
    pub accel: i32,
    pub distance: i32,
    pub speed: i32,
    pub stripe_count: u32,
}

impl TelemetryFrame {
    /// Build from kinematics. Values truncate toward zero.
    pub fn from_kinematics(team_id: u8, state_code: u8, k: &Kinematics) -> Self {
        Self {
            team_id,
            state_code,
            accel: k.accel as i32,
            distance: k.distance as i32,
            speed: k.speed as i32,
            stripe_count: k.stripe_count as u32,
        }
    }

    #[inline]
    pub const fn odometer(&self) -> u32 {
        self.stripe_count / STRIPES_PER_ODOMETER_UNIT
    }
}

/// Encode a frame into its wire form.
pub fn encode(frame: &TelemetryFrame) -> [u8; TELEMETRY_FRAME_LEN] {
    let mut buf = [0u8; TELEMETRY_FRAME_LEN];
    buf[0] = frame.team_id;
    buf[1] = frame.state_code;
    buf[2..6].copy_from_slice(&frame.accel.to_be_bytes());
    buf[6..10].copy_from_slice(&frame.distance.to_be_bytes());
    buf[10..14].copy_from_slice(&frame.speed.to_be_bytes());
    // 14..30 reserved, already zero
    buf[30..34].copy_from_slice(&frame.odometer().to_be_bytes());
    buf
}
