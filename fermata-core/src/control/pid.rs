//! Outer PID: beer setpoint → fridge setpoint
//!
//! The fridge-air setpoint is the actuator of the beer loop. P acts on
//! the slow-filtered beer error, I on an integral updated once per
//! minute, D on the beer temperature slope (not the error), so setpoint
//! changes cause no derivative kick.
//!
//! The integrator is heavily gated: it runs only while the state machine
//! is Idle (the fridge has reached its setpoint, so a remaining beer
//! error really is the integrator's to fix), it freezes when the fridge
//! setpoint is pinned against a limit, and it bleeds toward zero when
//! the error is too large for integral action to be meaningful. On a
//! plant where the compressor has a ten-minute minimum cycle this is
//! what keeps the cascade from winding up.

use fermata_protocol::ControlMode;

use crate::config::{ControlConstants, ControlSettings};
use crate::temp::{constrain, mul_factor, mul_factor_long, TempDiff, TempLong, Temperature};

use super::state::ControlState;

/// Integrator cadence in ticks (one update per minute at 1 Hz)
const INTEGRATOR_INTERVAL_TICKS: u8 = 60;

/// Fridge-air error beyond which the actuator is considered saturated
const SATURATION_BAND: TempDiff = TempDiff::from_degrees(2);

/// Published per-tick loop internals, reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlVariables {
    /// Beer setpoint minus slow-filtered beer temperature
    pub beer_diff: TempDiff,
    /// Beer temperature slope, degrees per minute
    pub beer_slope: TempDiff,
    /// Accumulated beer error
    pub diff_integral: TempLong,
    /// Proportional component of the fridge setpoint offset
    pub p: TempLong,
    /// Integral component
    pub i: TempLong,
    /// Derivative component
    pub d: TempLong,
}

/// Outer PID state
#[derive(Debug, Default)]
pub struct BeerPid {
    vars: ControlVariables,
    cadence: u8,
}

impl BeerPid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loop internals for host status reporting
    pub fn variables(&self) -> &ControlVariables {
        &self.vars
    }

    /// Run one tick of the outer loop
    ///
    /// In beer-tracking modes this rewrites `cs.fridge_setting`. In
    /// FridgeConstant it disables the beer setpoint. Off and Test leave
    /// the settings alone.
    pub fn update(
        &mut self,
        cs: &mut ControlSettings,
        cc: &ControlConstants,
        beer_slow: Temperature,
        beer_slope: TempDiff,
        fridge_fast: Temperature,
        state: ControlState,
    ) {
        if cs.mode.tracks_beer() {
            if cs.beer_setting.is_disabled_or_invalid() {
                // no beer setpoint yet, so no fridge setpoint either
                cs.fridge_setting = Temperature::DISABLED;
                return;
            }

            self.vars.beer_diff = cs.beer_setting - beer_slow;
            self.vars.beer_slope = beer_slope;

            self.cadence += 1;
            if self.cadence >= INTEGRATOR_INTERVAL_TICKS {
                self.cadence = 0;
                self.update_integral(cs, cc, fridge_fast, state);
            }

            self.vars.p = mul_factor(cc.kp, self.vars.beer_diff);
            self.vars.i = mul_factor_long(cc.ki, self.vars.diff_integral);
            self.vars.d = mul_factor(cc.kd, self.vars.beer_slope);

            let new_setting = cs.beer_setting.widen() + self.vars.p + self.vars.i + self.vars.d;

            let lower = if cs.beer_setting <= cc.temp_setting_min + cc.pid_max {
                cc.temp_setting_min
            } else {
                cs.beer_setting - cc.pid_max
            };
            let upper = if cs.beer_setting >= cc.temp_setting_max - cc.pid_max {
                cc.temp_setting_max
            } else {
                cs.beer_setting + cc.pid_max
            };

            cs.fridge_setting = constrain(new_setting, lower, upper);
        } else if cs.mode == ControlMode::FridgeConstant {
            // fridge setpoint is set manually; the beer loop is out
            cs.beer_setting = Temperature::DISABLED;
        }
    }

    fn update_integral(
        &mut self,
        cs: &ControlSettings,
        cc: &ControlConstants,
        fridge_fast: Temperature,
        state: ControlState,
    ) {
        let mut update = self.vars.beer_diff;

        if state != ControlState::Idle {
            // the fridge has not settled on its setpoint; any remaining
            // beer error is not yet the integrator's problem
            update = TempDiff::ZERO;
        } else if update.abs() < cc.i_max_error {
            let update_positive = update.is_positive();
            let integral_positive = self.vars.diff_integral.is_positive();

            if update_positive == integral_positive {
                // same sign, the integral would grow in magnitude.
                // Freeze it while the fridge setpoint is pinned against
                // a limit or the air temperature shows the actuator is
                // saturated.
                let saturated = cs.fridge_setting >= cc.temp_setting_max
                    || cs.fridge_setting <= cc.temp_setting_min
                    || (cs.fridge_setting - cs.beer_setting) >= cc.pid_max
                    || (cs.beer_setting - cs.fridge_setting) >= cc.pid_max
                    || (!update_positive
                        && fridge_fast > cs.fridge_setting + SATURATION_BAND)
                    || (update_positive
                        && fridge_fast < cs.fridge_setting - SATURATION_BAND);
                if saturated {
                    update = TempDiff::ZERO;
                }
            } else {
                // opposite sign: decay toward zero faster than growth
                update = TempDiff::saturate_raw(update.raw() as i32 * 2);
            }
        } else {
            // far from converged: bleed an eighth of the integral
            update = (-self.vars.diff_integral.shr(3)).to_diff();
        }

        self.vars.diff_integral = self.vars.diff_integral + update;
    }
}
