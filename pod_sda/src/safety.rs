//! Safety module root.
//!
//! Per-state abort ranges and the threshold evaluator that checks each
//! snapshot against them.

pub mod evaluator;
pub mod registry;
