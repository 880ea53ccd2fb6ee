//! Utility re-exports for the obstacle-avoidance controller.
//!
//! - `config`: compile-time thresholds and timings
//! - `controllers`: sensor, motor, maneuver and indicator components plus the
//!   control loop that ties them together
//! - `math`: integer range mapping used across components

pub mod config;
pub mod controllers;
pub mod math;

pub use controllers::{ControlError, ControlSnapshot, SystemController};
pub use math::mapping::distance_to_speed;
