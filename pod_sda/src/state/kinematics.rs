//! Kinematics derived from the sensor snapshot.

use pod_common::sensor::{SensorKey, SensorSnapshot};

/// Motion state used by run-state exit conditions and telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// [ft/s]
    pub speed: f64,
    /// [G]
    pub accel: f64,
    /// [ft]
    pub distance: f64,
    /// Mean of the left and right laser stripe counters.
    pub stripe_count: f64,
    /// Brake line pressure at or below the ready threshold.
    pub brakes_applied: bool,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            speed: 0.0,
            accel: 0.0,
            distance: 0.0,
            stripe_count: 0.0,
            brakes_applied: true,
        }
    }
}

impl Kinematics {
    /// Refresh from `snapshot`. Absent readings keep the previous value.
    pub fn update(&mut self, snapshot: &SensorSnapshot, brake_ready_pressure: f64) {
        if let Some(v) = snapshot.get(SensorKey::MotorSpeed) {
            self.speed = v;
        }
        if let Some(a) = snapshot.get(SensorKey::Imu1X) {
            self.accel = a;
        }
        if let Some(d) = snapshot.get(SensorKey::MotorDistance) {
            self.distance = d;
        }
        match (
            snapshot.get(SensorKey::LstLeft),
            snapshot.get(SensorKey::LstRight),
        ) {
            (Some(l), Some(r)) => self.stripe_count = (l + r) / 2.0,
            (Some(one), None) | (None, Some(one)) => self.stripe_count = one,
            (None, None) => {}
        }
        if let Some(p) = snapshot.get(SensorKey::BrakePressure) {
            self.brakes_applied = p <= brake_ready_pressure;
        }
    }
}
