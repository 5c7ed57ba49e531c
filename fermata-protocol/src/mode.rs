//! Control mode and temperature unit wire values

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Wire format characters, fixed for host compatibility
const MODE_OFF: char = 'o';
const MODE_BEER_CONSTANT: char = 'b';
const MODE_BEER_PROFILE: char = 'p';
const MODE_FRIDGE_CONSTANT: char = 'f';
const MODE_TEST: char = 't';

/// Control mode selected by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlMode {
    /// Control disabled, setpoints cleared
    #[default]
    Off,
    /// Hold the beer at a fixed setpoint
    BeerConstant,
    /// Track a beer setpoint ramped externally by the host
    BeerProfile,
    /// Hold the fridge air at a fixed setpoint, beer setpoint disabled
    FridgeConstant,
    /// Actuators under external control, the loop does not drive them
    Test,
}

impl ControlMode {
    /// Parse a mode from its wire character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            MODE_OFF => Some(ControlMode::Off),
            MODE_BEER_CONSTANT => Some(ControlMode::BeerConstant),
            MODE_BEER_PROFILE => Some(ControlMode::BeerProfile),
            MODE_FRIDGE_CONSTANT => Some(ControlMode::FridgeConstant),
            MODE_TEST => Some(ControlMode::Test),
            _ => None,
        }
    }

    /// Convert to the wire character
    pub fn as_char(self) -> char {
        match self {
            ControlMode::Off => MODE_OFF,
            ControlMode::BeerConstant => MODE_BEER_CONSTANT,
            ControlMode::BeerProfile => MODE_BEER_PROFILE,
            ControlMode::FridgeConstant => MODE_FRIDGE_CONSTANT,
            ControlMode::Test => MODE_TEST,
        }
    }

    /// Returns true if the beer setpoint drives the control loop
    pub fn tracks_beer(self) -> bool {
        matches!(self, ControlMode::BeerConstant | ControlMode::BeerProfile)
    }
}

/// Temperature display unit
///
/// Only affects how the host formats values; the fixed-point
/// representation inside the controller is unit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Parse a unit from its wire character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(TempUnit::Celsius),
            'F' => Some(TempUnit::Fahrenheit),
            _ => None,
        }
    }

    /// Convert to the wire character
    pub fn as_char(self) -> char {
        match self {
            TempUnit::Celsius => 'C',
            TempUnit::Fahrenheit => 'F',
        }
    }
}
