//! Car state messages shared by every car port.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical sensor a steering angle estimate was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleSource {
    /// Stock steering angle sensor.
    #[default]
    Primary,
    /// Auxiliary angle sensor (ZSS), calibrated on every engagement.
    Secondary,
    /// Torque-sensor angle, calibrated once.
    Tertiary,
}

impl AngleSource {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            AngleSource::Primary => "stock",
            AngleSource::Secondary => "zss",
            AngleSource::Tertiary => "torque",
        }
    }
}

impl fmt::Display for AngleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Gear selector position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GearShifter {
    #[default]
    Unknown,
    Park,
    Drive,
    Neutral,
    Reverse,
    Sport,
    Low,
    Brake,
}

/// Button a [`ButtonEvent`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonType {
    Unknown,
    SetCruise,
    Cancel,
    AccelCruise,
    DecelCruise,
    /// Lane keeping toggle.
    AltButton1,
}

/// A discrete button press or release derived from state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub button_type: ButtonType,
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn new(button_type: ButtonType, pressed: bool) -> Self {
        Self {
            button_type,
            pressed,
        }
    }
}

/// Alerts and requests published to the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    ButtonEnable,
    /// Re-engagement after a brake disengagement, without a chime.
    SilentButtonEnable,
    ButtonCancel,
    ManualSteeringRequired,
    ManualLongitudinalRequired,
    AutomaticBrakehold,
    CanError,
    DoorOpen,
    SeatbeltNotLatched,
    WrongGear,
    EspDisabled,
    StockAeb,
    SteerTempUnavailable,
}

/// Per-wheel speeds in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelSpeeds {
    pub fl: f64,
    pub fr: f64,
    pub rl: f64,
    pub rr: f64,
}

impl WheelSpeeds {
    /// Mean of the four wheels.
    pub fn mean(&self) -> f64 {
        (self.fl + self.fr + self.rl + self.rr) / 4.0
    }
}

/// Normalized cruise control state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CruiseState {
    /// Main switch on.
    pub available: bool,
    /// Cruise engaged.
    pub enabled: bool,
    /// Cruise holding the car at standstill.
    pub standstill: bool,
    /// Plain (non-adaptive) cruise mode.
    pub non_adaptive: bool,
    /// Set speed in m/s.
    pub speed: f64,
}

/// Normalized vehicle state for one control cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// All checked bus messages were fresh this cycle.
    pub can_valid: bool,

    pub wheel_speeds: WheelSpeeds,
    /// Unfiltered mean wheel speed (m/s).
    pub v_ego_raw: f64,
    /// Filtered speed (m/s).
    pub v_ego: f64,
    /// Filtered acceleration (m/s^2).
    pub a_ego: f64,
    pub standstill: bool,

    pub steering_angle_deg: f64,
    pub steer_source: AngleSource,
    pub steering_rate_deg: f64,
    /// Driver torque.
    pub steering_torque: f64,
    pub steering_torque_eps: f64,
    pub steering_pressed: bool,
    pub steer_warning: bool,

    pub door_open: bool,
    pub seatbelt_unlatched: bool,

    pub brake_pressed: bool,
    pub brake_hold_active: bool,
    pub brake_lights: bool,
    pub gas: f64,
    pub gas_pressed: bool,

    pub cruise_state: CruiseState,
    pub gear_shifter: GearShifter,

    pub left_blinker: bool,
    pub right_blinker: bool,
    pub left_blindspot: bool,
    pub right_blindspot: bool,
    pub generic_toggle: bool,
    pub esp_disabled: bool,
    pub stock_aeb: bool,

    pub lkas_enabled: bool,
    pub below_lane_change_speed: bool,
    pub automatic_lane_change: bool,
    /// Automatic brake hold governor requests a hold.
    pub brakehold_governor: bool,
    /// Following distance in bars.
    pub gap_adjust_cruise_tr: u8,

    pub button_events: Vec<ButtonEvent>,
    pub events: Vec<EventName>,
}
