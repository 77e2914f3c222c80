//! # Pod SDA Library
//!
//! State Determination Algorithm for the HyperLynx hyperloop pod. Every
//! cycle it ingests a sensor snapshot, evaluates per-state abort ranges,
//! advances the pod state machine, turns the command vector into actuator
//! edges, and emits a telemetry datagram and an audit log.
//!
//! ## Layers
//!
//! 1. **Abort registry**: per-state safe ranges with sticky fault bits
//! 2. **Threshold evaluator**: range checks, fault accounting, trigger aborts
//! 3. **State machine**: forward cycle plus the abort short-circuit
//! 4. **Command mediator**: edge-triggered actuator intents
//! 5. **Reporting**: 34-byte telemetry frame and tab-delimited log lines
//! 6. **Cycle orchestrator**: run-state logic and brake re-pressurization
//!
//! Hardware, operator console, telemetry transport and log storage are
//! reached through the traits in [`io`].

pub mod command;
pub mod config;
pub mod cycle;
pub mod error;
pub mod io;
pub mod report;
pub mod rt;
pub mod safety;
pub mod sim;
pub mod state;
