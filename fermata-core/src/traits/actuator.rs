//! Switch actuator traits

/// On/off output (relay, SSR, GPIO)
pub trait SwitchActuator {
    /// Drive the output
    fn set_active(&mut self, active: bool);

    /// Current output state
    fn is_active(&self) -> bool;

    /// Whether real hardware backs this output
    ///
    /// The state machine refuses to enter Heating/Cooling when the
    /// corresponding output is not installed.
    fn is_installed(&self) -> bool {
        true
    }
}

/// Actuator slot with nothing attached
///
/// Ignores writes and reports uninstalled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullActuator;

impl SwitchActuator for NullActuator {
    fn set_active(&mut self, _active: bool) {}

    fn is_active(&self) -> bool {
        false
    }

    fn is_installed(&self) -> bool {
        false
    }
}

/// Actuator that only remembers its state
///
/// Backs pure flags such as the camera-light timer, and test doubles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueActuator {
    active: bool,
}

impl SwitchActuator for ValueActuator {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
