//! Collaborator traits
//!
//! These traits define the interface between the control core and
//! hardware-specific implementations. Boards inject implementations at
//! construction; the defaults (`NullActuator`, `DisconnectedSensor`)
//! stand in for hardware that is not installed.

pub mod actuator;
pub mod link;
pub mod sensor;

pub use actuator::{NullActuator, SwitchActuator, ValueActuator};
pub use link::{HostLink, NullLink};
pub use sensor::{BoolSensor, DisconnectedSensor, SensorError, TempSensorBackend, ValueSensor};
