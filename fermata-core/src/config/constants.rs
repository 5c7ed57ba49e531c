//! Control constants
//!
//! Tuning parameters for the cascaded loop. Loaded once at startup from
//! the NV store, or from [`ControlConstants::default`] on first boot.

use fermata_protocol::TempUnit;

use crate::temp::{TempDiff, Temperature};

use serde::{Deserialize, Serialize};

/// Persistent control constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlConstants {
    /// Display unit on the host link
    pub unit: TempUnit,

    /// Lowest legal setpoint
    pub temp_setting_min: Temperature,
    /// Highest legal setpoint
    pub temp_setting_max: Temperature,

    /// Outer loop proportional gain
    pub kp: TempDiff,
    /// Outer loop integral gain
    pub ki: TempDiff,
    /// Outer loop derivative gain, negative: a rising beer slope pulls
    /// the fridge setpoint down
    pub kd: TempDiff,
    /// Beer error band inside which the integrator is active
    pub i_max_error: TempDiff,

    /// Lower edge of the idle dead-band around the fridge setpoint
    /// (negative)
    pub idle_range_low: TempDiff,
    /// Upper edge of the idle dead-band around the fridge setpoint
    pub idle_range_high: TempDiff,

    /// Filter coefficients, the `b` shift value of each cascade.
    /// Delay time is about 3.33 · 2^b · sections samples.
    pub fridge_fast_filter: u8,
    pub fridge_slow_filter: u8,
    pub fridge_slope_filter: u8,
    pub beer_fast_filter: u8,
    pub beer_slow_filter: u8,
    pub beer_slope_filter: u8,

    /// Use the chamber light as a heater when no heater is installed
    pub light_as_heater: bool,

    /// Maximum deviation of the fridge setpoint from the beer setpoint
    pub pid_max: TempDiff,

    /// Heater PWM period in seconds
    pub heat_pwm_period_s: u16,
    /// Cooler PWM period in seconds (long: compressor)
    pub cool_pwm_period_s: u16,

    /// Inner fridge loop gains
    pub fridge_pwm_kp_heat: TempDiff,
    pub fridge_pwm_ki_heat: TempDiff,
    pub fridge_pwm_kp_cool: TempDiff,
    pub fridge_pwm_ki_cool: TempDiff,

    /// Beer heater loop gains
    pub beer_pwm_kp_heat: TempDiff,
    pub beer_pwm_ki_heat: TempDiff,
}

impl Default for ControlConstants {
    fn default() -> Self {
        Self {
            unit: TempUnit::Celsius,
            temp_setting_min: Temperature::from_degrees(1),
            temp_setting_max: Temperature::from_degrees(110),
            kp: TempDiff::from_scaled_100(500),
            ki: TempDiff::from_scaled_100(25),
            kd: TempDiff::from_scaled_100(-150),
            i_max_error: TempDiff::from_degrees(1),
            idle_range_low: TempDiff::from_scaled_100(-10),
            idle_range_high: TempDiff::from_scaled_100(10),
            fridge_fast_filter: 1,
            fridge_slow_filter: 4,
            fridge_slope_filter: 3,
            beer_fast_filter: 3,
            beer_slow_filter: 4,
            beer_slope_filter: 4,
            light_as_heater: false,
            pid_max: TempDiff::from_degrees(10),
            heat_pwm_period_s: 4,
            cool_pwm_period_s: 600,
            fridge_pwm_kp_heat: TempDiff::from_degrees(20),
            fridge_pwm_ki_heat: TempDiff::from_degrees(2),
            fridge_pwm_kp_cool: TempDiff::from_degrees(20),
            fridge_pwm_ki_cool: TempDiff::from_degrees(2),
            beer_pwm_kp_heat: TempDiff::from_degrees(20),
            beer_pwm_ki_heat: TempDiff::from_degrees(2),
        }
    }
}
