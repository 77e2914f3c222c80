//! Command processing root.
//!
//! Edge-triggered mediation of the command vector onto the actuators.

pub mod mediator;
