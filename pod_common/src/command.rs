//! Command vector, actuator memory and actuator intents.
//!
//! The command vector is what the operator (or automation) and the SDA
//! want the actuators to be. `ActuatorState` is what was last applied.
//! The mediator turns the difference into `ActuatorIntent`s.

use serde::{Deserialize, Serialize};

/// Requested values for every command slot, refreshed each cycle.
///
/// `launch` is consumed by the state machine; every other slot maps to an
/// actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandVector {
    /// Launch cue. Cleared by the SDA once consumed.
    #[serde(default)]
    pub launch: bool,
    /// High-voltage contactors closed.
    #[serde(default)]
    pub high_voltage: bool,
    /// Brake vent solenoid closed (line sealed). Open vent applies brakes.
    #[serde(default = "default_vent_closed")]
    pub vent_closed: bool,
    /// Brake reservoir #1 solenoid open.
    #[serde(default)]
    pub reservoir_1: bool,
    /// Brake reservoir #2 solenoid open.
    #[serde(default)]
    pub reservoir_2: bool,
    /// Motor controller coolant pump running.
    #[serde(default)]
    pub coolant_pump: bool,
    /// Motor throttle, 0.0 to 1.0.
    #[serde(default)]
    pub throttle: f64,
}

fn default_vent_closed() -> bool {
    true
}

impl Default for CommandVector {
    fn default() -> Self {
        Self {
            launch: false,
            high_voltage: false,
            vent_closed: true,
            reservoir_1: false,
            reservoir_2: false,
            coolant_pump: false,
            throttle: 0.0,
        }
    }
}

/// Last-applied actuator values as remembered by the mediator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorState {
    pub high_voltage: bool,
    pub vent_closed: bool,
    pub reservoir_1: bool,
    pub reservoir_2: bool,
    pub coolant_pump: bool,
    pub throttle: f64,
}

impl Default for ActuatorState {
    /// Boot state: HV open, vent closed, reservoirs closed, pump off.
    fn default() -> Self {
        Self {
            high_voltage: false,
            vent_closed: true,
            reservoir_1: false,
            reservoir_2: false,
            coolant_pump: false,
            throttle: 0.0,
        }
    }
}

/// Actuator slots tracked by the mediator, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorSlot {
    HighVoltage,
    VentSolenoid,
    Reservoir1,
    Reservoir2,
    CoolantPump,
    Throttle,
}

impl ActuatorSlot {
    pub const ALL: [ActuatorSlot; 6] = [
        Self::HighVoltage,
        Self::VentSolenoid,
        Self::Reservoir1,
        Self::Reservoir2,
        Self::CoolantPump,
        Self::Throttle,
    ];
}

/// One edge-triggered actuator change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorIntent {
    /// Close (`true`) or open the HV contactors.
    HighVoltage(bool),
    /// Close (`true`) or open the brake vent.
    VentSolenoid(bool),
    /// Open (`true`) or close reservoir #1.
    Reservoir1(bool),
    /// Open (`true`) or close reservoir #2.
    Reservoir2(bool),
    /// Start (`true`) or stop the coolant pump.
    CoolantPump(bool),
    /// New throttle setting.
    Throttle(f64),
}

impl ActuatorIntent {
    /// Slot this intent drives.
    pub const fn slot(&self) -> ActuatorSlot {
        match self {
            Self::HighVoltage(_) => ActuatorSlot::HighVoltage,
            Self::VentSolenoid(_) => ActuatorSlot::VentSolenoid,
            Self::Reservoir1(_) => ActuatorSlot::Reservoir1,
            Self::Reservoir2(_) => ActuatorSlot::Reservoir2,
            Self::CoolantPump(_) => ActuatorSlot::CoolantPump,
            Self::Throttle(_) => ActuatorSlot::Throttle,
        }
    }
}
