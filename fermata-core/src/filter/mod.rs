//! Cascaded exponential filters
//!
//! Digital low-pass filtering for the temperature probes, fixed point
//! throughout. A filter is a chain of three identical exponential
//! sections; each section keeps 16 extra fraction bits of state so that
//! small inputs are not lost to truncation at high coefficients.
//!
//! The coefficient is a shift value `b` in `0..=4`. Each section updates
//! `state += (input − state) >> (b + 2)`; the step-response delay of the
//! full cascade is roughly `3.33 · 2^b · sections` samples.

use crate::temp::Temperature;

/// Largest legal filter coefficient
pub const MAX_FILTER_SHIFT: u8 = 4;

/// Sections per cascade
pub const SECTIONS: usize = 3;

/// Extra fraction bits kept in section state
const STATE_FRAC_BITS: u32 = 16;

/// Shift applied on top of the coefficient in every section
const BASE_SHIFT: u8 = 2;

/// One exponential section
///
/// State and I/O are in extra-precision units: the Q7.9 raw value shifted
/// left by 16.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct FixedFilter {
    state: i32,
    shift: u8,
}

impl FixedFilter {
    const fn new(shift: u8) -> Self {
        Self { state: 0, shift }
    }

    fn init(&mut self, value: i32) {
        self.state = value;
    }

    fn set_shift(&mut self, shift: u8) {
        self.shift = shift;
    }

    fn add(&mut self, input: i32) -> i32 {
        // i64 spans the worst-case delta between extremes
        let delta = (input as i64) - (self.state as i64);
        let step = delta >> ((self.shift + BASE_SHIFT) as u32);
        self.state = ((self.state as i64) + step) as i32;
        self.state
    }

    const fn output(&self) -> i32 {
        self.state
    }
}

/// Three exponential sections in series
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CascadedFilter {
    sections: [FixedFilter; SECTIONS],
}

impl CascadedFilter {
    /// Create a cascade with coefficient `b` (clamped to `0..=4`),
    /// state at zero
    pub const fn new(b: u8) -> Self {
        let b = if b > MAX_FILTER_SHIFT {
            MAX_FILTER_SHIFT
        } else {
            b
        };
        Self {
            sections: [FixedFilter::new(b); SECTIONS],
        }
    }

    /// Change the coefficient without resetting filter history
    pub fn set_coefficient(&mut self, b: u8) {
        let b = b.min(MAX_FILTER_SHIFT);
        for section in &mut self.sections {
            section.set_shift(b);
        }
    }

    /// Seed every section so the output equals `value` immediately
    pub fn init(&mut self, value: Temperature) {
        let precise = (value.raw() as i32) << STATE_FRAC_BITS;
        for section in &mut self.sections {
            section.init(precise);
        }
    }

    /// Feed one sample through the cascade
    pub fn add(&mut self, value: Temperature) -> Temperature {
        let mut signal = (value.raw() as i32) << STATE_FRAC_BITS;
        for section in &mut self.sections {
            signal = section.add(signal);
        }
        self.output()
    }

    /// Current output, rounded to Q7.9
    pub fn output(&self) -> Temperature {
        let precise = self.sections[SECTIONS - 1].output();
        let rounded = (precise + (1 << (STATE_FRAC_BITS - 1))) >> STATE_FRAC_BITS;
        Temperature::from_raw(rounded as i16)
    }

    /// Current output in extra-precision units (Q7.9 raw shifted left 16)
    ///
    /// The slope computation differences consecutive values of this;
    /// the rounded output would quantise slow ramps to zero.
    pub fn output_precise(&self) -> i32 {
        self.sections[SECTIONS - 1].output()
    }
}

/// One exponential section operating directly on extra-precision values
///
/// Used for the slope filter, whose input is a difference of precise
/// outputs rather than a temperature sample.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PreciseFilter {
    inner: FixedFilter,
}

impl PreciseFilter {
    pub const fn new(b: u8) -> Self {
        let b = if b > MAX_FILTER_SHIFT {
            MAX_FILTER_SHIFT
        } else {
            b
        };
        Self {
            inner: FixedFilter::new(b),
        }
    }

    pub fn set_coefficient(&mut self, b: u8) {
        self.inner.set_shift(b.min(MAX_FILTER_SHIFT));
    }

    pub fn init(&mut self, value: i32) {
        self.inner.init(value);
    }

    pub fn add(&mut self, value: i32) -> i32 {
        self.inner.add(value)
    }

    pub const fn output(&self) -> i32 {
        self.inner.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_seeds_output() {
        let mut filter = CascadedFilter::new(2);
        let t = Temperature::from_degrees(20);
        filter.init(t);
        assert_eq!(filter.output(), t);
        // feeding the same value keeps the output pinned
        for _ in 0..10 {
            filter.add(t);
        }
        assert_eq!(filter.output(), t);
    }

    #[test]
    fn test_step_response_converges() {
        let mut filter = CascadedFilter::new(0);
        filter.init(Temperature::from_degrees(20));
        let step = Temperature::from_degrees(21);

        let mut previous = filter.output();
        for _ in 0..100 {
            let out = filter.add(step);
            // monotonic approach toward the step, never overshooting
            assert!(out >= previous);
            assert!(out <= step);
            previous = out;
        }
        // well within a hundredth of a degree after ~10 delay times
        assert!((step - filter.output()).abs().to_scaled_100() <= 1);
    }

    #[test]
    fn test_higher_coefficient_is_slower() {
        let mut fast = CascadedFilter::new(0);
        let mut slow = CascadedFilter::new(4);
        let start = Temperature::from_degrees(20);
        fast.init(start);
        slow.init(start);

        let step = Temperature::from_degrees(25);
        for _ in 0..20 {
            fast.add(step);
            slow.add(step);
        }
        assert!(fast.output() > slow.output());
    }

    #[test]
    fn test_set_coefficient_keeps_state() {
        let mut filter = CascadedFilter::new(0);
        let t = Temperature::from_degrees(20);
        filter.init(t);
        filter.add(Temperature::from_degrees(25));
        let before = filter.output_precise();

        filter.set_coefficient(4);
        assert_eq!(filter.output_precise(), before);
    }

    #[test]
    fn test_coefficient_clamped() {
        let mut filter = CascadedFilter::new(9);
        let mut reference = CascadedFilter::new(MAX_FILTER_SHIFT);
        let start = Temperature::from_degrees(0);
        filter.init(start);
        reference.init(start);
        let step = Temperature::from_degrees(10);
        for _ in 0..5 {
            filter.add(step);
            reference.add(step);
        }
        assert_eq!(filter.output_precise(), reference.output_precise());
    }

    #[test]
    fn test_precise_filter_tracks_small_signal() {
        // a delta far below one raw unit survives in a precise filter;
        // integer truncation stalls within one quantisation step (2^3)
        let mut filter = PreciseFilter::new(1);
        for _ in 0..200 {
            filter.add(100);
        }
        assert!((filter.output() - 100).abs() < 8);
    }
}
