//! Minimum-cycle limiter
//!
//! Compressors are damaged by short cycling: once started they must run
//! for a minimum time, and once stopped they must rest before the next
//! start. This wrapper enforces both intervals. Layers above (the PWM
//! driver) request states freely; a disallowed transition is held
//! pending and applied by [`MinCycleActuator::update`] once the interval
//! has elapsed.
//!
//! The internal clock starts at zero at boot with the output off, so the
//! first switch-on is also delayed by the minimum off-time. A reset
//! storm (flaky supervisor script restarting the board) therefore cannot
//! short-cycle the compressor either.

use crate::traits::SwitchActuator;

/// Default minimum on-time in seconds
pub const DEFAULT_MIN_ON_S: u32 = 120;

/// Default minimum off-time in seconds
pub const DEFAULT_MIN_OFF_S: u32 = 180;

/// On/off limiter enforcing minimum cycle times
#[derive(Debug)]
pub struct MinCycleActuator<A> {
    inner: A,
    min_on_s: u32,
    min_off_s: u32,
    active: bool,
    pending: Option<bool>,
    now_s: u32,
    last_change_s: u32,
}

impl<A: SwitchActuator> MinCycleActuator<A> {
    /// Wrap an output with the default compressor intervals
    pub fn new(inner: A) -> Self {
        Self::with_times(inner, DEFAULT_MIN_ON_S, DEFAULT_MIN_OFF_S)
    }

    /// Wrap an output with explicit minimum on/off times in seconds
    pub fn with_times(inner: A, min_on_s: u32, min_off_s: u32) -> Self {
        Self {
            inner,
            min_on_s,
            min_off_s,
            active: false,
            pending: None,
            now_s: 0,
            last_change_s: 0,
        }
    }

    /// Advance the internal clock by one second and apply any pending
    /// transition that has become legal
    pub fn update(&mut self) {
        self.now_s = self.now_s.wrapping_add(1);
        if let Some(want) = self.pending {
            if want == self.active {
                self.pending = None;
            } else if self.allowed(want) {
                self.apply(want);
            }
        }
    }

    /// Seconds the output has been in its current state
    pub fn time_in_state(&self) -> u32 {
        self.now_s.wrapping_sub(self.last_change_s)
    }

    fn allowed(&self, want: bool) -> bool {
        let elapsed = self.time_in_state();
        if want {
            elapsed >= self.min_off_s
        } else {
            elapsed >= self.min_on_s
        }
    }

    fn apply(&mut self, want: bool) {
        self.inner.set_active(want);
        self.active = want;
        self.last_change_s = self.now_s;
        self.pending = None;
    }

    /// Access the wrapped output
    pub fn bare(&self) -> &A {
        &self.inner
    }
}

impl<A: SwitchActuator> SwitchActuator for MinCycleActuator<A> {
    fn set_active(&mut self, active: bool) {
        if active == self.active {
            self.pending = None;
            return;
        }
        if self.allowed(active) {
            self.apply(active);
        } else {
            self.pending = Some(active);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn is_installed(&self) -> bool {
        self.inner.is_installed()
    }
}
