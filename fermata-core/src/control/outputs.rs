//! Inner PI: fridge-air error → PWM duty
//!
//! Runs every tick while the state machine requests Heating or Cooling.
//! The error fed to the integrator is clamped to ±1° so a large
//! transient cannot load it faster than the plant can respond, and the
//! duty saturation is fed back with unit gain (back-calculation), in
//! both directions, so the integrator unwinds while the output is
//! pinned.
//!
//! The integrator also accumulates while Idle: when actuation starts,
//! the integral term already reflects the standing error instead of
//! starting cold.

use crate::config::ControlConstants;
use crate::temp::{mul_factor, mul_factor_long, TempDiff, TempLong, Temperature};

use super::state::ControlState;

/// Integrator error clamp (±1°)
const ERROR_CLAMP: TempDiff = TempDiff::from_degrees(1);

/// Integrator scale: ÷60 for the once-per-minute convention shared with
/// the outer loop, ×4 more because the P gain is divided by 4
const INTEGRATOR_SCALE: i32 = 240;

/// Constrained duty full scale, ≈64° in Q7.9; maps to 100% PWM
const DUTY_FULL_SCALE: TempLong = TempLong::from_raw(i16::MAX as i32);

/// Duty requests for the two chamber actuators
///
/// At most one of the two is ever non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmDuties {
    pub heat: u8,
    pub cool: u8,
}

/// Inner PI state
#[derive(Debug, Default)]
pub struct FridgePi {
    integrator: TempLong,
}

impl FridgePi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated fridge-air error
    pub fn integrator(&self) -> TempLong {
        self.integrator
    }

    /// Run one tick of the inner loop
    pub fn update(
        &mut self,
        state: ControlState,
        cc: &ControlConstants,
        fridge_setting: Temperature,
        fridge_fast: Temperature,
    ) -> PwmDuties {
        let error = fridge_setting - fridge_fast;
        let error_for_integral = error.clamp(-ERROR_CLAMP, ERROR_CLAMP);

        let mut anti_windup = TempLong::ZERO;

        let duties = match state {
            ControlState::Heating => {
                // Kp/4 keeps the proportional part inside the ±64°
                // intermediate range; the duty is scaled back by 4 below
                let p = mul_factor(quarter(cc.fridge_pwm_kp_heat), error);
                let i = mul_factor_long(
                    cc.fridge_pwm_ki_heat,
                    self.integrator.div_int(INTEGRATOR_SCALE),
                );
                let duty_long = p.saturating_add(i);
                let constrained = duty_long.clamp(TempLong::ZERO, DUTY_FULL_SCALE);
                // negative when saturated high, unwinding the integrator
                anti_windup = back_calculation(constrained, duty_long).clamp(
                    TempLong::from_raw(i32::MIN),
                    TempLong::ZERO,
                );
                PwmDuties {
                    heat: to_duty(constrained),
                    cool: 0,
                }
            }
            ControlState::Cooling => {
                let p = mul_factor(quarter(cc.fridge_pwm_kp_cool), error);
                let i = mul_factor_long(
                    cc.fridge_pwm_ki_cool,
                    self.integrator.div_int(INTEGRATOR_SCALE),
                );
                let duty_long = p.saturating_add(i);
                let constrained = duty_long.clamp(-DUTY_FULL_SCALE, TempLong::ZERO);
                // positive when saturated low
                anti_windup = back_calculation(constrained, duty_long).clamp(
                    TempLong::ZERO,
                    TempLong::from_raw(i32::MAX),
                );
                PwmDuties {
                    heat: 0,
                    cool: to_duty(constrained),
                }
            }
            _ => PwmDuties::default(),
        };

        // prime the integrator even while idle, but never from sentinel
        // values
        if !fridge_setting.is_disabled_or_invalid() && !fridge_fast.is_disabled_or_invalid() {
            self.integrator = self.integrator + error_for_integral + anti_windup;
        }

        duties
    }
}

fn quarter(gain: TempDiff) -> TempDiff {
    TempDiff::from_raw(gain.raw() / 4)
}

fn back_calculation(constrained: TempLong, unconstrained: TempLong) -> TempLong {
    TempLong::from_raw(constrained.raw().saturating_sub(unconstrained.raw()))
}

/// Rescale a constrained duty (|value| ≤ [`DUTY_FULL_SCALE`]) to 0..=255
fn to_duty(constrained: TempLong) -> u8 {
    let magnitude = constrained.raw().unsigned_abs();
    ((magnitude * 4) >> crate::temp::FRAC_BITS).min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setting(deg: i16) -> Temperature {
        Temperature::from_degrees(deg)
    }

    #[test]
    fn test_idle_drives_nothing() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        for state in [ControlState::Idle, ControlState::Off, ControlState::DoorOpen] {
            let duties = pi.update(state, &cc, setting(20), setting(25));
            assert_eq!(duties, PwmDuties::default());
        }
    }

    #[test]
    fn test_heating_duty() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        // half a degree low: P = 5 × 0.5° = 2.5°, duty = 4 × 2.5° ≈ 20
        let duties = pi.update(
            ControlState::Heating,
            &cc,
            setting(20),
            Temperature::from_scaled_100(1950),
        );
        assert!(duties.heat > 0);
        assert_eq!(duties.cool, 0);
        assert_eq!(duties.heat, 10);
    }

    #[test]
    fn test_cooling_duty() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        let duties = pi.update(ControlState::Cooling, &cc, setting(4), setting(6));
        assert_eq!(duties.heat, 0);
        assert_eq!(duties.cool, 40);
    }

    #[test]
    fn test_never_both_active() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        for state in [
            ControlState::Off,
            ControlState::Idle,
            ControlState::Cooling,
            ControlState::Heating,
            ControlState::DoorOpen,
        ] {
            for fast_deg in [0, 10, 20, 30] {
                let duties = pi.update(state, &cc, setting(20), setting(fast_deg));
                assert!(duties.heat == 0 || duties.cool == 0);
            }
        }
    }

    #[test]
    fn test_integrator_primes_while_idle() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        // half a degree of standing error accumulates each tick
        pi.update(ControlState::Idle, &cc, setting(20), Temperature::from_scaled_100(1950));
        assert_eq!(pi.integrator().raw(), 256);
        pi.update(ControlState::Idle, &cc, setting(20), Temperature::from_scaled_100(1950));
        assert_eq!(pi.integrator().raw(), 512);
    }

    #[test]
    fn test_integrator_error_clamped() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        // ten degrees of error only loads one degree per tick
        pi.update(ControlState::Idle, &cc, setting(20), setting(10));
        assert_eq!(pi.integrator().raw(), 512);
    }

    #[test]
    fn test_integrator_ignores_invalid_readings() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        pi.update(ControlState::Idle, &cc, setting(20), Temperature::INVALID);
        pi.update(ControlState::Idle, &cc, Temperature::DISABLED, setting(20));
        assert!(pi.integrator().is_zero());
    }

    #[test]
    fn test_saturated_heating_unwinds_integrator() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        // enormous error: P alone saturates the duty; back-calculation
        // pulls the integrator down instead of letting it wind up
        let duties = pi.update(ControlState::Heating, &cc, setting(110), setting(1));
        assert_eq!(duties.heat, 255);
        assert!(pi.integrator().is_negative());
    }

    #[test]
    fn test_saturated_cooling_unwinds_integrator() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        let duties = pi.update(ControlState::Cooling, &cc, setting(1), setting(64));
        assert_eq!(duties.cool, 255);
        assert!(pi.integrator().is_positive());
    }

    #[test]
    fn test_unsaturated_duty_has_no_anti_windup() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();

        pi.update(
            ControlState::Heating,
            &cc,
            setting(20),
            Temperature::from_scaled_100(1950),
        );
        // only the clamped error entered the integrator
        assert_eq!(pi.integrator().raw(), 256);
    }

    #[test]
    fn test_integral_term_builds_duty() {
        let cc = ControlConstants::default();
        let mut pi = FridgePi::new();
        let fast = Temperature::from_scaled_100(1950);

        let first = pi.update(ControlState::Heating, &cc, setting(20), fast).heat;
        let mut last = first;
        for _ in 0..600 {
            last = pi.update(ControlState::Heating, &cc, setting(20), fast).heat;
        }
        // the standing error accumulates into a growing duty
        assert!(last > first);
    }
}
