//! Flight simulation.
//!
//! A deterministic pod model implementing [`crate::io::PodIo`] and a
//! scripted command source that flies one launch/brake/crawl/stop profile.

pub mod autopilot;
pub mod physics;
