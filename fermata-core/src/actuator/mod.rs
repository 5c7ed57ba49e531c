//! Actuator building blocks
//!
//! - [`PwmActuator`] — slow PWM over an on/off output
//! - [`MinCycleActuator`] — minimum on/off time limiter for compressors
//! - [`AutoOffActuator`] — self-expiring switch (camera light)

pub mod auto_off;
pub mod limiter;
pub mod pwm;

pub use auto_off::AutoOffActuator;
pub use limiter::MinCycleActuator;
pub use pwm::{PwmActuator, PWM_MAX};
