//! Control state machine
//!
//! Selects what the chamber should be doing from the fridge-air
//! temperature, the setpoint and the installed hardware. Transitions are
//! a pure function of a [`StateInputs`] snapshot, so every rule is unit
//! testable without a controller.
//!
//! Hysteresis: entry into Heating/Cooling requires the temperature to
//! leave the idle dead-band, exit happens at the exact setpoint
//! crossing. The band edges therefore never chatter.

use fermata_protocol::ControlMode;

use crate::temp::{TempDiff, Temperature};

/// Control states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlState {
    /// Mode is Off; no actuation
    Off,
    /// Inside the dead-band, or not allowed to act
    Idle,
    /// Compressor duty requested
    Cooling,
    /// Heater duty requested
    Heating,
    /// Door open; behaves as Idle for actuator drive. Entry is driven
    /// externally when a door-triggered hold is configured.
    DoorOpen,
}

impl ControlState {
    pub fn is_heating(self) -> bool {
        matches!(self, ControlState::Heating)
    }

    pub fn is_cooling(self) -> bool {
        matches!(self, ControlState::Cooling)
    }
}

/// Everything a transition decision depends on
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateInputs {
    pub mode: ControlMode,
    pub fridge_setting: Temperature,
    pub fridge_fast: Temperature,
    pub fridge_connected: bool,
    pub beer_connected: bool,
    pub idle_range_low: TempDiff,
    pub idle_range_high: TempDiff,
    pub cooler_installed: bool,
    pub heater_installed: bool,
    pub light_installed: bool,
    pub light_as_heater: bool,
}

/// Which timestamp the controller should record for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMark {
    None,
    Idle,
    Cooling,
    Heating,
}

/// Result of one state decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub next: ControlState,
    pub mark: TimerMark,
}

/// Decide the next state for one tick
pub fn next_state(current: ControlState, inputs: &StateInputs) -> Transition {
    let mut state = current;
    let mut stay_idle = false;

    if inputs.mode == ControlMode::Off {
        state = ControlState::Off;
        stay_idle = true;
    }

    // stay idle when a required sensor is gone or the setpoint is unset
    if inputs.fridge_setting.is_disabled_or_invalid()
        || !inputs.fridge_connected
        || (inputs.mode.tracks_beer() && !inputs.beer_connected)
    {
        state = ControlState::Idle;
        stay_idle = true;
    }

    match state {
        ControlState::Idle | ControlState::Off => {
            if stay_idle {
                return Transition {
                    next: state,
                    mark: TimerMark::Idle,
                };
            }

            let next = if inputs.fridge_fast > inputs.fridge_setting + inputs.idle_range_high {
                if inputs.cooler_installed {
                    ControlState::Cooling
                } else {
                    state
                }
            } else if inputs.fridge_fast < inputs.fridge_setting + inputs.idle_range_low {
                if inputs.heater_installed || (inputs.light_as_heater && inputs.light_installed) {
                    ControlState::Heating
                } else {
                    state
                }
            } else {
                // within the dead-band, always settle into Idle
                ControlState::Idle
            };

            Transition {
                next,
                mark: TimerMark::Idle,
            }
        }

        ControlState::Cooling => {
            if !inputs.cooler_installed {
                return Transition {
                    next: ControlState::Idle,
                    mark: TimerMark::None,
                };
            }
            // exit at the exact setpoint crossing; the cooling timestamp
            // still covers this final tick
            let next = if inputs.fridge_fast <= inputs.fridge_setting {
                ControlState::Idle
            } else {
                ControlState::Cooling
            };
            Transition {
                next,
                mark: TimerMark::Cooling,
            }
        }

        ControlState::Heating => {
            if !inputs.heater_installed {
                return Transition {
                    next: ControlState::Idle,
                    mark: TimerMark::None,
                };
            }
            let next = if inputs.fridge_fast >= inputs.fridge_setting {
                ControlState::Idle
            } else {
                ControlState::Heating
            };
            Transition {
                next,
                mark: TimerMark::Heating,
            }
        }

        ControlState::DoorOpen => Transition {
            next: ControlState::DoorOpen,
            mark: TimerMark::None,
        },
    }
}
