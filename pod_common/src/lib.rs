//! Pod Common Library
//!
//! Shared types for the HyperLynx pod State Determination Algorithm (SDA).
//!
//! # Module Structure
//!
//! - [`consts`] - Wire-format constants and configuration defaults
//! - [`state`] - Pod state codes
//! - [`sensor`] - Sensor key enumeration and per-cycle snapshot
//! - [`abort`] - Abort-range entries and the tabular abort-range loader
//! - [`command`] - Command vector, actuator memory and actuator intents
//! - [`config`] - TOML configuration structures and loading
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pod_common::prelude::*;
//!
//! let key: SensorKey = "Brake_Pressure".parse().unwrap();
//! assert_eq!(key.as_str(), "Brake_Pressure");
//! ```

pub mod abort;
pub mod command;
pub mod config;
pub mod consts;
pub mod prelude;
pub mod sensor;
pub mod state;
