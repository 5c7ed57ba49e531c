//! Slow PWM over an on/off output
//!
//! Heaters and compressors are driven through relays or SSRs, so PWM
//! periods are seconds to minutes rather than kilohertz. The wave is
//! advanced by calling [`PwmActuator::update_pwm`] once per tick.
//!
//! Fractional on-time is carried across periods: a duty whose on-time is
//! not a whole number of ticks accumulates the remainder and inserts an
//! extra on-tick once enough has built up, so low duties produce
//! correctly spaced pulses instead of none at all.

use crate::traits::SwitchActuator;

/// Duty value mapping to 100%
pub const PWM_MAX: u8 = u8::MAX;

/// Square-wave driver for an on/off output
#[derive(Debug)]
pub struct PwmActuator<A> {
    inner: A,
    period_s: u16,
    duty: u8,
    /// Position inside the current period, in ticks
    tick: u16,
    /// On-time of the current period, in ticks
    on_ticks: u16,
    /// Fractional on-time carried to the next period, in duty·tick units
    carry: u32,
}

impl<A: SwitchActuator> PwmActuator<A> {
    /// Wrap an output with the given period in seconds
    pub fn new(inner: A, period_s: u16) -> Self {
        Self {
            inner,
            period_s,
            duty: 0,
            tick: 0,
            on_ticks: 0,
            carry: 0,
        }
    }

    /// Request a duty cycle (0..=[`PWM_MAX`])
    ///
    /// Zero cuts the output at the next tick; other changes take effect
    /// at the next period boundary so the carry bookkeeping stays exact.
    pub fn set_pwm(&mut self, duty: u8) {
        self.duty = duty;
    }

    /// Currently requested duty cycle
    pub fn pwm(&self) -> u8 {
        self.duty
    }

    /// Change the period; restarts the wave
    pub fn set_period(&mut self, period_s: u16) {
        self.period_s = period_s;
        self.tick = 0;
        self.on_ticks = 0;
        self.carry = 0;
    }

    pub fn period(&self) -> u16 {
        self.period_s
    }

    /// Advance the wave by one tick
    pub fn update_pwm(&mut self) {
        if self.period_s == 0 {
            self.inner.set_active(self.duty > 0);
            return;
        }

        if self.tick == 0 {
            let total = u32::from(self.duty) * u32::from(self.period_s) + self.carry;
            self.on_ticks = (total / u32::from(PWM_MAX)) as u16;
            self.carry = total % u32::from(PWM_MAX);
        }

        let active = self.duty > 0 && self.tick < self.on_ticks;
        self.inner.set_active(active);

        self.tick += 1;
        if self.tick >= self.period_s {
            self.tick = 0;
        }
    }

    /// Whether real hardware backs this output
    pub fn is_installed(&self) -> bool {
        self.inner.is_installed()
    }

    /// Access the wrapped output
    pub fn bare(&self) -> &A {
        &self.inner
    }

    /// Mutable access to the wrapped output
    pub fn bare_mut(&mut self) -> &mut A {
        &mut self.inner
    }
}
