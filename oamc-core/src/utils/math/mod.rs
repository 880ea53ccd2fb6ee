//! Math utilities for the obstacle-avoidance controller.
//!
//! This module provides the integer distance/speed/duty mappings.

pub mod mapping;
