//! Command mediator.
//!
//! Compares the command vector with the remembered actuator state and emits
//! one intent per slot that changed. Memory is updated on emission, so
//! replaying an unchanged vector emits nothing. No heap allocation.

use heapless::Vec;
use pod_common::command::{ActuatorIntent, ActuatorSlot, ActuatorState, CommandVector};

/// Upper bound on intents per call: one per actuator slot.
pub const MAX_INTENTS: usize = ActuatorSlot::ALL.len();

pub type IntentList = Vec<ActuatorIntent, MAX_INTENTS>;

/// Emit an intent for every slot where `commands` differs from `memory`.
pub fn apply(commands: &CommandVector, memory: &mut ActuatorState) -> IntentList {
    let mut intents = IntentList::new();

    for slot in ActuatorSlot::ALL {
        let intent = match slot {
            ActuatorSlot::HighVoltage => edge(&mut memory.high_voltage, commands.high_voltage)
                .map(ActuatorIntent::HighVoltage),
            ActuatorSlot::VentSolenoid => edge(&mut memory.vent_closed, commands.vent_closed)
                .map(ActuatorIntent::VentSolenoid),
            ActuatorSlot::Reservoir1 => {
                edge(&mut memory.reservoir_1, commands.reservoir_1).map(ActuatorIntent::Reservoir1)
            }
            ActuatorSlot::Reservoir2 => {
                edge(&mut memory.reservoir_2, commands.reservoir_2).map(ActuatorIntent::Reservoir2)
            }
            ActuatorSlot::CoolantPump => edge(&mut memory.coolant_pump, commands.coolant_pump)
                .map(ActuatorIntent::CoolantPump),
            ActuatorSlot::Throttle => {
                throttle_edge(&mut memory.throttle, commands.throttle).map(ActuatorIntent::Throttle)
            }
        };
        if let Some(intent) = intent {
            // Capacity equals the slot count.
            let _ = intents.push(intent);
        }
    }

    intents
}

#[inline]
fn edge<T: PartialEq + Copy>(remembered: &mut T, commanded: T) -> Option<T> {
    if *remembered == commanded {
        None
    } else {
        *remembered = commanded;
        Some(commanded)
    }
}

/// Bitwise comparison so a NaN setpoint is emitted once, not every cycle.
#[inline]
fn throttle_edge(remembered: &mut f64, commanded: f64) -> Option<f64> {
    if remembered.to_bits() == commanded.to_bits() {
        None
    } else {
        *remembered = commanded;
        Some(commanded)
    }
}
