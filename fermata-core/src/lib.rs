//! Board-agnostic thermal control core for the fermentation chamber firmware
//!
//! This crate contains all control logic that does not depend on specific
//! hardware implementations:
//!
//! - Fixed-point temperature formats (Q7.9)
//! - Cascaded exponential filters and the filtered temperature sensor
//! - PWM actuators, the compressor minimum-cycle limiter, auto-off switch
//! - The cascaded control loop: beer PID, state machine, fridge PI
//! - Configuration types, defaults, and persistence
//! - Collaborator traits (sensors, switches, host link)
//!
//! The loop is tick-driven: an external scheduler calls
//! [`control::ChamberController::tick`] once per second and may call the
//! setter/getter methods between ticks on the same executor. Nothing in
//! this crate blocks or suspends.

#![no_std]
#![deny(unsafe_code)]

pub mod actuator;
pub mod config;
pub mod control;
pub mod filter;
pub mod sensor;
pub mod temp;
pub mod traits;
