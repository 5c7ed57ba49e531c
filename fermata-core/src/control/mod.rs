//! The cascaded control loop
//!
//! Three cooperating components, composed by the controller:
//!
//! - [`BeerPid`] — outer PID, translates the beer setpoint into a
//!   fridge-air setpoint
//! - [`next_state`] — state machine selecting Idle / Heating / Cooling
//! - [`FridgePi`] — inner PI, turns the fridge-air error into PWM duty
//!
//! [`ChamberController`] owns the components and the collaborators and
//! executes them in order on every tick.

pub mod controller;
pub mod outputs;
pub mod pid;
pub mod state;

pub use controller::{ChamberController, ChamberHal, ChamberParts};
pub use outputs::{FridgePi, PwmDuties};
pub use pid::{BeerPid, ControlVariables};
pub use state::{next_state, ControlState, StateInputs, TimerMark, Transition};
