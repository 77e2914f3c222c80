//! State module root.
//!
//! Pod state machine with fault accounting, and the kinematics derived
//! from each sensor snapshot.

pub mod kinematics;
pub mod machine;
