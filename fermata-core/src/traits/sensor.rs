//! Sensor traits

use crate::temp::Temperature;

/// Errors that can occur when reading a temperature probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Probe not present on the bus
    Disconnected,
    /// Bus transaction failed (CRC, timeout)
    Bus,
    /// Reading outside the plausible range for the probe
    OutOfRange,
}

/// Raw temperature probe
///
/// Implementations wrap the actual bus driver (1-wire, I²C, ADC). Both
/// operations are non-blocking polls; `read` returns the most recent
/// conversion.
pub trait TempSensorBackend {
    /// Read the current temperature
    fn read(&mut self) -> Result<Temperature, SensorError>;

    /// (Re)initialise the probe and return a first reading
    ///
    /// Called at startup and again whenever the probe has dropped off
    /// the bus.
    fn init(&mut self) -> Result<Temperature, SensorError>;
}

/// Binary sensor (door switch)
pub trait BoolSensor {
    fn sense(&mut self) -> bool;
}

/// Backend for a probe slot with nothing attached
///
/// Every operation reports [`SensorError::Disconnected`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedSensor;

impl TempSensorBackend for DisconnectedSensor {
    fn read(&mut self) -> Result<Temperature, SensorError> {
        Err(SensorError::Disconnected)
    }

    fn init(&mut self) -> Result<Temperature, SensorError> {
        Err(SensorError::Disconnected)
    }
}

/// Binary sensor holding a plain value
///
/// Default door sensor when none is configured; also used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSensor {
    pub value: bool,
}

impl BoolSensor for ValueSensor {
    fn sense(&mut self) -> bool {
        self.value
    }
}
