//! The chamber controller
//!
//! Owns the control components and every injected collaborator, and
//! composes them into the once-per-second tick. One instance is created
//! by the composition root and passed around explicitly; there are no
//! globals.
//!
//! Tick order is observable and fixed: sensors → outer PID → state
//! machine → inner PI and auxiliary outputs → PWM drive. Setting a
//! setpoint between ticks re-runs PID and the state machine right away,
//! so the next tick acts on the new value.

use fermata_hal::{Clock, NvStore};
use fermata_protocol::{Annotation, ControlMode};

use crate::actuator::auto_off::DEFAULT_TIMEOUT_S;
use crate::actuator::{AutoOffActuator, MinCycleActuator, PwmActuator};
use crate::config::{store, ControlConstants, ControlSettings};
use crate::sensor::FilteredSensor;
use crate::temp::{TempDiff, Temperature};
use crate::traits::{BoolSensor, HostLink, SwitchActuator, TempSensorBackend, ValueActuator};

use super::outputs::FridgePi;
use super::pid::{BeerPid, ControlVariables};
use super::state::{next_state, ControlState, StateInputs, TimerMark};

/// Beer setpoint changes below this threshold are not persisted in
/// profile mode, where the host ramps the setpoint continuously and
/// would wear out the NV store (±0.25°)
const PROFILE_STORE_THRESHOLD: TempDiff = TempDiff::from_scaled_100(25);

/// Collaborator types for one chamber
///
/// Boards implement this on a marker type; the associated types pick
/// the concrete sensor, actuator, clock, store and link implementations
/// injected into the controller.
pub trait ChamberHal {
    type BeerSensor: TempSensorBackend;
    type FridgeSensor: TempSensorBackend;
    type AmbientSensor: TempSensorBackend;
    type Heater: SwitchActuator;
    type Cooler: SwitchActuator;
    type BeerHeater: SwitchActuator;
    type Light: SwitchActuator;
    type Fan: SwitchActuator;
    type Door: BoolSensor;
    type Clock: Clock;
    type Store: NvStore;
    type Link: HostLink;
}

/// The collaborator instances handed to [`ChamberController::new`]
pub struct ChamberParts<H: ChamberHal> {
    pub beer_sensor: H::BeerSensor,
    pub fridge_sensor: H::FridgeSensor,
    pub ambient_sensor: H::AmbientSensor,
    pub heater: H::Heater,
    pub cooler: H::Cooler,
    pub beer_heater: H::BeerHeater,
    pub light: H::Light,
    pub fan: H::Fan,
    pub door: H::Door,
    pub clock: H::Clock,
    pub store: H::Store,
    pub link: H::Link,
}

/// The thermal control core of one fermentation chamber
pub struct ChamberController<H: ChamberHal> {
    beer_sensor: FilteredSensor<H::BeerSensor>,
    fridge_sensor: FilteredSensor<H::FridgeSensor>,
    ambient_sensor: H::AmbientSensor,
    ambient_temp: Temperature,

    heater: PwmActuator<H::Heater>,
    cooler: PwmActuator<MinCycleActuator<H::Cooler>>,
    beer_heater: PwmActuator<H::BeerHeater>,
    light: H::Light,
    fan: H::Fan,
    camera_light: AutoOffActuator<ValueActuator>,
    door: H::Door,

    clock: H::Clock,
    store: H::Store,
    link: H::Link,

    cc: ControlConstants,
    cs: ControlSettings,
    pid: BeerPid,
    pi: FridgePi,
    state: ControlState,
    door_open: bool,

    /// Last settings written to the store, for write coalescing
    stored_settings: Option<ControlSettings>,
    /// Beer setpoint as stored, for the profile-mode wear rule
    stored_beer_setting: Temperature,

    last_idle_time: u32,
    last_heat_time: u32,
    last_cool_time: u32,
}

impl<H: ChamberHal> ChamberController<H> {
    /// Build a controller from its collaborators, with default
    /// constants and settings
    pub fn new(parts: ChamberParts<H>) -> Self {
        let cc = ControlConstants::default();
        let heater = PwmActuator::new(parts.heater, cc.heat_pwm_period_s);
        let cooler = PwmActuator::new(
            MinCycleActuator::new(parts.cooler),
            cc.cool_pwm_period_s,
        );
        let beer_heater = PwmActuator::new(parts.beer_heater, cc.heat_pwm_period_s);

        Self {
            beer_sensor: FilteredSensor::new(parts.beer_sensor),
            fridge_sensor: FilteredSensor::new(parts.fridge_sensor),
            ambient_sensor: parts.ambient_sensor,
            ambient_temp: Temperature::INVALID,
            heater,
            cooler,
            beer_heater,
            light: parts.light,
            fan: parts.fan,
            camera_light: AutoOffActuator::new(ValueActuator::default(), DEFAULT_TIMEOUT_S),
            door: parts.door,
            clock: parts.clock,
            store: parts.store,
            link: parts.link,
            cc,
            cs: ControlSettings::default(),
            pid: BeerPid::new(),
            pi: FridgePi::new(),
            state: ControlState::Idle,
            door_open: false,
            stored_settings: None,
            stored_beer_setting: Temperature::DISABLED,
            last_idle_time: 0,
            last_heat_time: 0,
            last_cool_time: 0,
        }
    }

    /// One-time startup: connect the probes, apply filter coefficients
    /// and take a first reading
    ///
    /// The heat/cool timestamps stay at zero, so no actuation happens
    /// until the compressor minimum off-time has passed after reset.
    pub fn init(&mut self) {
        self.state = ControlState::Idle;
        self.camera_light.set_active(false);
        let _ = self.beer_sensor.init();
        let _ = self.fridge_sensor.init();
        self.init_filters();
        self.update_temperatures();
    }

    /// One control cycle, invoked once per second by the scheduler
    pub fn tick(&mut self) {
        self.update_temperatures();
        self.update_pid();
        self.update_state();
        self.update_outputs();
        self.update_pwm();
    }

    fn update_temperatures(&mut self) {
        self.beer_sensor.update();
        if !self.beer_sensor.is_connected() {
            let _ = self.beer_sensor.init();
        }
        self.fridge_sensor.update();
        if !self.fridge_sensor.is_connected() {
            let _ = self.fridge_sensor.init();
        }

        // keep the ambient value fresh so a host status request never
        // waits on a conversion
        self.ambient_temp = match self.ambient_sensor.read() {
            Ok(reading) => reading,
            Err(_) => match self.ambient_sensor.init() {
                Ok(reading) => reading,
                Err(_) => Temperature::INVALID,
            },
        };
    }

    fn update_pid(&mut self) {
        self.pid.update(
            &mut self.cs,
            &self.cc,
            self.beer_sensor.read_slow_filtered(),
            self.beer_sensor.read_slope(),
            self.fridge_sensor.read_fast_filtered(),
            self.state,
        );
    }

    fn update_state(&mut self) {
        let door_now = self.door.sense();
        if door_now != self.door_open {
            self.door_open = door_now;
            self.link.annotate(if door_now {
                Annotation::DoorOpened
            } else {
                Annotation::DoorClosed
            });
        }

        let inputs = StateInputs {
            mode: self.cs.mode,
            fridge_setting: self.cs.fridge_setting,
            fridge_fast: self.fridge_sensor.read_fast_filtered(),
            fridge_connected: self.fridge_sensor.is_connected(),
            beer_connected: self.beer_sensor.is_connected(),
            idle_range_low: self.cc.idle_range_low,
            idle_range_high: self.cc.idle_range_high,
            cooler_installed: self.cooler.is_installed(),
            heater_installed: self.heater.is_installed(),
            light_installed: self.light.is_installed(),
            light_as_heater: self.cc.light_as_heater,
        };

        let transition = next_state(self.state, &inputs);
        self.state = transition.next;

        let now = self.clock.seconds();
        match transition.mark {
            TimerMark::Idle => self.last_idle_time = now,
            TimerMark::Cooling => self.last_cool_time = now,
            TimerMark::Heating => self.last_heat_time = now,
            TimerMark::None => {}
        }
    }

    fn update_outputs(&mut self) {
        if self.cs.mode == ControlMode::Test {
            // actuators are under external control
            return;
        }

        self.camera_light.update();

        let heating = self.state.is_heating();
        let cooling = self.state.is_cooling();

        self.light.set_active(
            self.door_open
                || (self.cc.light_as_heater && heating)
                || self.camera_light.is_active(),
        );
        self.fan.set_active(heating || cooling);

        let duties = self.pi.update(
            self.state,
            &self.cc,
            self.cs.fridge_setting,
            self.fridge_sensor.read_fast_filtered(),
        );
        self.heater.set_pwm(duties.heat);
        self.cooler.set_pwm(duties.cool);
    }

    fn update_pwm(&mut self) {
        // advance the compressor limiter clock before the wave
        self.cooler.bare_mut().update();
        self.heater.update_pwm();
        self.cooler.update_pwm();
        self.beer_heater.update_pwm();
    }

    /// Change the control mode
    ///
    /// A mode change forces the state machine back to Idle. `force`
    /// persists (and re-applies) the mode even when unchanged, used
    /// when restoring settings at boot.
    pub fn set_mode(&mut self, mode: ControlMode, force: bool) {
        let mut force = force;
        if mode != self.cs.mode {
            self.state = ControlState::Idle;
            force = true;
        }
        if force {
            self.cs.mode = mode;
            if mode == ControlMode::Off {
                self.cs.beer_setting = Temperature::DISABLED;
                self.cs.fridge_setting = Temperature::DISABLED;
            }
            self.write_settings();
        }
    }

    /// Change the beer setpoint and act on it immediately
    pub fn set_beer_temp(&mut self, setpoint: Temperature) {
        self.cs.beer_setting = setpoint;
        self.update_pid();
        self.update_state();

        // In profile mode the host ramps the setpoint a fraction of a
        // degree at a time; only changes beyond the threshold reach the
        // NV store. The host re-sends the setpoint after a reset anyway.
        if self.cs.mode != ControlMode::BeerProfile
            || (self.stored_beer_setting - setpoint).abs() > PROFILE_STORE_THRESHOLD
        {
            self.persist_settings();
        }
    }

    /// Change the fridge setpoint and act on it immediately
    pub fn set_fridge_temp(&mut self, setpoint: Temperature) {
        self.cs.fridge_setting = setpoint;
        self.update_pid();
        self.update_state();
        self.persist_settings();
    }

    /// Fast-filtered beer temperature, INVALID when disconnected
    pub fn beer_temp(&self) -> Temperature {
        self.beer_sensor.read_fast_filtered()
    }

    /// Fast-filtered fridge-air temperature, INVALID when disconnected
    pub fn fridge_temp(&self) -> Temperature {
        self.fridge_sensor.read_fast_filtered()
    }

    /// Most recent ambient reading, INVALID when no probe answers
    pub fn ambient_temp(&self) -> Temperature {
        self.ambient_temp
    }

    pub fn beer_setting(&self) -> Temperature {
        self.cs.beer_setting
    }

    pub fn fridge_setting(&self) -> Temperature {
        self.cs.fridge_setting
    }

    pub fn mode(&self) -> ControlMode {
        self.cs.mode
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_door_open(&self) -> bool {
        self.door_open
    }

    /// Requested heater duty (0..=255)
    pub fn heater_duty(&self) -> u8 {
        self.heater.pwm()
    }

    /// Requested cooler duty (0..=255)
    pub fn cooler_duty(&self) -> u8 {
        self.cooler.pwm()
    }

    /// Outer loop internals for host status reporting
    pub fn control_variables(&self) -> &ControlVariables {
        self.pid.variables()
    }

    pub fn constants(&self) -> &ControlConstants {
        &self.cc
    }

    /// Replace the constants, re-apply them and persist best-effort
    pub fn set_constants(&mut self, constants: ControlConstants) {
        self.cc = constants;
        self.apply_constants();
        let _ = store::store_constants(&mut self.store, &self.cc);
    }

    pub fn time_since_cooling(&self) -> u32 {
        self.clock.time_since(self.last_cool_time)
    }

    pub fn time_since_heating(&self) -> u32 {
        self.clock.time_since(self.last_heat_time)
    }

    pub fn time_since_idle(&self) -> u32 {
        self.clock.time_since(self.last_idle_time)
    }

    /// Turn the camera light on; it expires on its own
    pub fn activate_camera_light(&mut self) {
        self.camera_light.set_active(true);
    }

    /// Load constants from the store, keeping the current ones when the
    /// block is missing or unreadable
    pub fn load_constants(&mut self) {
        if let Ok(constants) = store::load_constants(&mut self.store) {
            self.cc = constants;
            self.apply_constants();
        }
    }

    /// Persist the current constants, best-effort
    pub fn store_constants(&mut self) {
        let _ = store::store_constants(&mut self.store, &self.cc);
    }

    /// Reset the constants to their defaults
    pub fn load_default_constants(&mut self) {
        self.cc = ControlConstants::default();
        self.apply_constants();
    }

    /// Restore settings from the store and re-apply the mode
    pub fn load_settings(&mut self) {
        if let Ok(settings) = store::load_settings(&mut self.store) {
            self.cs = settings;
            self.stored_settings = Some(settings);
            self.stored_beer_setting = settings.beer_setting;
            self.set_mode(settings.mode, true);
        }
    }

    /// Reset to the default settings: everything off, setpoints unset
    pub fn load_default_settings(&mut self) {
        self.cs.beer_setting = Temperature::DISABLED;
        self.cs.fridge_setting = Temperature::DISABLED;
        self.set_mode(ControlMode::Off, true);
    }

    /// Re-apply the six filter coefficients from the constants
    pub fn init_filters(&mut self) {
        self.fridge_sensor.set_fast_coefficient(self.cc.fridge_fast_filter);
        self.fridge_sensor.set_slow_coefficient(self.cc.fridge_slow_filter);
        self.fridge_sensor.set_slope_coefficient(self.cc.fridge_slope_filter);
        self.beer_sensor.set_fast_coefficient(self.cc.beer_fast_filter);
        self.beer_sensor.set_slow_coefficient(self.cc.beer_slow_filter);
        self.beer_sensor.set_slope_coefficient(self.cc.beer_slope_filter);
    }

    fn apply_constants(&mut self) {
        self.init_filters();
        self.heater.set_period(self.cc.heat_pwm_period_s);
        self.beer_heater.set_period(self.cc.heat_pwm_period_s);
        self.cooler.set_period(self.cc.cool_pwm_period_s);
    }

    /// Write settings unless they match the last stored copy
    fn persist_settings(&mut self) {
        if self.stored_settings.as_ref() == Some(&self.cs) {
            return;
        }
        self.write_settings();
    }

    /// Write settings unconditionally, best-effort: a failed write
    /// never alters in-memory state
    fn write_settings(&mut self) {
        if store::store_settings(&mut self.store, &self.cs).is_ok() {
            self.stored_settings = Some(self.cs);
            self.stored_beer_setting = self.cs.beer_setting;
        }
    }
}
