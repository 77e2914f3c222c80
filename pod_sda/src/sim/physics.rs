//! Deterministic flight model.
//!
//! Brake pneumatics: an open vent bleeds the line to near zero; with the vent
//! closed, an open reservoir charges it to 200 psi; otherwise it holds.
//! Brakes are applied at or below the ready pressure.
//!
//! Motion: with brakes released and HV on,
//! `a[G] = throttle · 0.7 · (1 − v/300 · 0.2) − 0.05`. With brakes applied
//! and the pod moving, `a = −5 G`. Speed integrates at 32.174 ft/s² per G
//! and never goes negative. One laser stripe every 100 ft.
//!
//! Every other sensor reports a fixed nominal value.

use std::time::Duration;

use pod_common::command::ActuatorIntent;
use pod_common::sensor::{SensorKey, SensorSnapshot};

use crate::io::PodIo;

/// Gravitational acceleration [ft/s² per G].
pub const FT_PER_S2_PER_G: f64 = 32.174;

/// Line pressure with a reservoir open and the vent closed [psi].
pub const CHARGED_PRESSURE: f64 = 200.0;

/// Line pressure with the vent open [psi].
pub const VENTED_PRESSURE: f64 = 0.01;

/// Braking deceleration [G].
pub const BRAKING_DECEL_G: f64 = -5.0;

/// HV bus voltage with contactors closed [V].
pub const HV_BUS_VOLTAGE: f64 = 500.0;

/// Track distance between laser stripes [ft].
pub const STRIPE_SPACING_FT: f64 = 100.0;

const NOMINAL: &[(SensorKey, f64)] = &[
    (SensorKey::BmsConn, 1.0),
    (SensorKey::BmsCellTempLeader, 35.0),
    (SensorKey::BmsCellVoltageLeader, 4.2),
    (SensorKey::BmsCellVoltageLaggard, 4.2),
    (SensorKey::BmsPackVoltage, 600.0),
    (SensorKey::SdConn, 1.0),
    (SensorKey::SdTemp, 30.0),
    (SensorKey::LvBattTemp, 20.0),
    (SensorKey::LvBattCurrent, 5.0),
    (SensorKey::LvBattVoltage, 11.7),
    (SensorKey::PvLeftTemp, 30.0),
    (SensorKey::PvLeftPressure, 12.0),
    (SensorKey::PvRightTemp, 30.0),
    (SensorKey::PvRightPressure, 12.0),
    (SensorKey::AmbientPressure, 0.1),
    (SensorKey::Imu1Y, -1.02),
    (SensorKey::Imu1Z, 0.0),
    (SensorKey::Imu2Y, -1.02),
    (SensorKey::Imu2Z, 0.0),
    (SensorKey::Lidar, 0.0),
    (SensorKey::GuiConn, 1.0),
    (SensorKey::RpiTemp, 40.0),
    (SensorKey::RpiProcLoad, 5.0),
    (SensorKey::RpiMemLoad, 5.0),
    (SensorKey::RpiDiskSpace, 14000.0),
];

/// Simulated pod: actuator latches plus point-mass kinematics.
#[derive(Debug, Clone)]
pub struct FlightSimulator {
    brake_ready_pressure: f64,
    leaking: bool,
    // Actuators
    high_voltage: bool,
    vent_closed: bool,
    reservoir_1: bool,
    reservoir_2: bool,
    coolant_pump: bool,
    throttle: f64,
    // Plant
    brake_pressure: f64,
    accel_g: f64,
    speed: f64,
    distance: f64,
    last_poll: Option<Duration>,
}

impl FlightSimulator {
    /// Pod at rest with HV off, vent closed and an empty brake line.
    pub fn new(brake_ready_pressure: f64) -> Self {
        Self {
            brake_ready_pressure,
            leaking: false,
            high_voltage: false,
            vent_closed: true,
            reservoir_1: false,
            reservoir_2: false,
            coolant_pump: false,
            throttle: 0.0,
            brake_pressure: 0.0,
            accel_g: 0.0,
            speed: 0.0,
            distance: 0.0,
            last_poll: None,
        }
    }

    /// Stop reservoir charging from ever reaching the line.
    ///
    /// Used to exercise the re-pressurization timeout.
    pub fn with_leaking_reservoirs(mut self) -> Self {
        self.leaking = true;
        self
    }

    /// Start the pod moving at `speed` ft/s.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Start with the brake line at `pressure` psi.
    pub fn with_brake_pressure(mut self, pressure: f64) -> Self {
        self.brake_pressure = pressure;
        self
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn brake_pressure(&self) -> f64 {
        self.brake_pressure
    }

    pub fn brakes_applied(&self) -> bool {
        self.brake_pressure <= self.brake_ready_pressure
    }

    pub fn high_voltage(&self) -> bool {
        self.high_voltage
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn coolant_pump(&self) -> bool {
        self.coolant_pump
    }

    fn update_pneumatics(&mut self) {
        if !self.vent_closed {
            self.brake_pressure = VENTED_PRESSURE;
        } else if (self.reservoir_1 || self.reservoir_2) && !self.leaking {
            self.brake_pressure = CHARGED_PRESSURE;
        }
    }

    fn update_motion(&mut self, dt: f64) {
        self.accel_g = if !self.brakes_applied() {
            let drive = if self.high_voltage { self.throttle } else { 0.0 };
            drive * 0.7 * (1.0 - self.speed / 300.0 * 0.2) - 0.05
        } else if self.speed > 0.0 {
            BRAKING_DECEL_G
        } else {
            0.0
        };

        self.speed = (self.speed + self.accel_g * FT_PER_S2_PER_G * dt).max(0.0);
        self.distance += self.speed * dt;
    }

    fn snapshot(&self) -> SensorSnapshot {
        let mut snap: SensorSnapshot = NOMINAL.iter().copied().collect();
        let stripes = (self.distance / STRIPE_SPACING_FT).floor();
        let bus = if self.high_voltage { HV_BUS_VOLTAGE } else { 0.0 };
        let current = if self.high_voltage { self.throttle * 340.0 } else { 0.0 };
        snap.set(SensorKey::SdHvBusVoltage, bus);
        snap.set(SensorKey::SdHvCurrent, current);
        snap.set(SensorKey::MotorSpeed, self.speed);
        snap.set(SensorKey::MotorDistance, self.distance);
        snap.set(SensorKey::Imu1X, self.accel_g);
        snap.set(SensorKey::Imu2X, self.accel_g);
        snap.set(SensorKey::BrakePressure, self.brake_pressure);
        snap.set(SensorKey::LstLeft, stripes);
        snap.set(SensorKey::LstRight, stripes);
        snap
    }
}

impl PodIo for FlightSimulator {
    fn name(&self) -> &str {
        "flight-sim"
    }

    fn poll(&mut self, now: Duration) -> SensorSnapshot {
        let dt = self
            .last_poll
            .map(|last| now.saturating_sub(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_poll = Some(now);

        self.update_pneumatics();
        self.update_motion(dt);
        self.snapshot()
    }

    fn actuate(&mut self, intent: ActuatorIntent) {
        match intent {
            ActuatorIntent::HighVoltage(on) => self.high_voltage = on,
            ActuatorIntent::VentSolenoid(closed) => self.vent_closed = closed,
            ActuatorIntent::Reservoir1(open) => self.reservoir_1 = open,
            ActuatorIntent::Reservoir2(open) => self.reservoir_2 = open,
            ActuatorIntent::CoolantPump(on) => self.coolant_pump = on,
            ActuatorIntent::Throttle(t) => self.throttle = t.clamp(0.0, 1.0),
        }
    }
}
