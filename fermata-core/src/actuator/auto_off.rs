//! Self-expiring switch
//!
//! Activation starts a countdown; the output drops on its own when the
//! countdown reaches zero. Used for the camera light, which a host
//! command turns on for a photo and nobody remembers to turn off.

use crate::traits::SwitchActuator;

/// Default timeout in seconds (10 minutes)
pub const DEFAULT_TIMEOUT_S: u32 = 600;

/// Switch that turns itself off after a timeout
#[derive(Debug)]
pub struct AutoOffActuator<A> {
    inner: A,
    timeout_s: u32,
    remaining_s: u32,
}

impl<A: SwitchActuator> AutoOffActuator<A> {
    /// Wrap an output with a timeout in seconds
    pub fn new(inner: A, timeout_s: u32) -> Self {
        Self {
            inner,
            timeout_s,
            remaining_s: 0,
        }
    }

    /// Advance the countdown by one second
    pub fn update(&mut self) {
        if self.remaining_s > 0 {
            self.remaining_s -= 1;
            if self.remaining_s == 0 {
                self.inner.set_active(false);
            }
        }
    }

    /// Access the wrapped output
    pub fn bare(&self) -> &A {
        &self.inner
    }
}

impl<A: SwitchActuator> SwitchActuator for AutoOffActuator<A> {
    /// Activation restarts the countdown from the full timeout
    fn set_active(&mut self, active: bool) {
        self.remaining_s = if active { self.timeout_s } else { 0 };
        self.inner.set_active(active);
    }

    fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    fn is_installed(&self) -> bool {
        self.inner.is_installed()
    }
}
