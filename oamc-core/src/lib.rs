//! Core of an ultrasonic obstacle-avoidance DC motor controller on no-std
//! embedded platforms.
//!
//! For a host-side run against simulated hardware, see `oamc-app/mock-mcu`.
#![no_std]

pub mod utils;
