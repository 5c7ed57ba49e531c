//! Control settings
//!
//! The host-mutable part of the configuration: mode and setpoints.
//! Persisted so that the chamber resumes control after a power cut
//! without waiting for the host.

use fermata_protocol::ControlMode;

use crate::temp::Temperature;

use serde::{Deserialize, Serialize};

/// Persisted mode and setpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlSettings {
    pub mode: ControlMode,
    pub beer_setting: Temperature,
    pub fridge_setting: Temperature,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            mode: ControlMode::Off,
            beer_setting: Temperature::DISABLED,
            fridge_setting: Temperature::DISABLED,
        }
    }
}
