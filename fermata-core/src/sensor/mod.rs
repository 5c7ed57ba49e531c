//! Filtered temperature sensor
//!
//! Wraps a raw probe backend in three filter cascades:
//!
//! - **fast** — lightly filtered, drives the state machine and the
//!   fridge PI loop
//! - **slow** — heavily filtered, provides the beer error for the outer
//!   PID
//! - **slope** — exponential filter over the per-sample change of the
//!   slow output, provides the derivative term
//!
//! On a read failure the sensor is flagged disconnected and temperature
//! reads return [`Temperature::INVALID`]; readings resume only after a
//! successful [`FilteredSensor::init`], which re-seeds the filters from
//! a fresh conversion so no stale history leaks into the loop.

use crate::filter::{CascadedFilter, PreciseFilter};
use crate::temp::{TempDiff, Temperature};
use crate::traits::{SensorError, TempSensorBackend};

/// Extra fraction bits of the precise filter outputs
const PRECISE_FRAC_BITS: u32 = 16;

/// Slope is reported per minute of 1 Hz samples
const SLOPE_SCALE_PER_MIN: i64 = 60;

/// Filter coefficient used until the configured ones are applied
const DEFAULT_COEFFICIENT: u8 = 2;

/// A temperature probe with fast/slow/slope filtering
#[derive(Debug)]
pub struct FilteredSensor<B> {
    backend: B,
    fast: CascadedFilter,
    slow: CascadedFilter,
    slope: PreciseFilter,
    prev_slow_precise: i32,
    connected: bool,
}

impl<B: TempSensorBackend> FilteredSensor<B> {
    /// Wrap a backend; starts disconnected until the first `init`
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            fast: CascadedFilter::new(DEFAULT_COEFFICIENT),
            slow: CascadedFilter::new(DEFAULT_COEFFICIENT),
            slope: PreciseFilter::new(DEFAULT_COEFFICIENT),
            prev_slow_precise: 0,
            connected: false,
        }
    }

    /// (Re)initialise the probe and seed the filters from its reading
    pub fn init(&mut self) -> Result<(), SensorError> {
        let reading = self.backend.init()?;
        self.fast.init(reading);
        self.slow.init(reading);
        self.prev_slow_precise = self.slow.output_precise();
        self.slope.init(0);
        self.connected = true;
        Ok(())
    }

    /// Poll the probe and advance the filters, once per tick
    pub fn update(&mut self) {
        match self.backend.read() {
            // a good reading after a disconnect is ignored until init()
            // re-seeds the filters
            Ok(reading) if self.connected => {
                self.fast.add(reading);
                self.slow.add(reading);
                let precise = self.slow.output_precise();
                self.slope.add(precise.wrapping_sub(self.prev_slow_precise));
                self.prev_slow_precise = precise;
            }
            Ok(_) => {}
            Err(_) => self.connected = false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Lightly filtered reading, [`Temperature::INVALID`] when
    /// disconnected
    pub fn read_fast_filtered(&self) -> Temperature {
        if self.connected {
            self.fast.output()
        } else {
            Temperature::INVALID
        }
    }

    /// Heavily filtered reading, [`Temperature::INVALID`] when
    /// disconnected
    pub fn read_slow_filtered(&self) -> Temperature {
        if self.connected {
            self.slow.output()
        } else {
            Temperature::INVALID
        }
    }

    /// Filtered temperature slope in degrees per minute (Q7.9)
    ///
    /// Zero while disconnected.
    pub fn read_slope(&self) -> TempDiff {
        if !self.connected {
            return TempDiff::ZERO;
        }
        let per_min =
            (self.slope.output() as i64 * SLOPE_SCALE_PER_MIN) >> PRECISE_FRAC_BITS;
        TempDiff::saturate_raw(per_min.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    pub fn set_fast_coefficient(&mut self, b: u8) {
        self.fast.set_coefficient(b);
    }

    pub fn set_slow_coefficient(&mut self, b: u8) {
        self.slow.set_coefficient(b);
    }

    pub fn set_slope_coefficient(&mut self, b: u8) {
        self.slope.set_coefficient(b);
    }

    /// Access the wrapped probe backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the wrapped probe backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
