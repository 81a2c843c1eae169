//! Toyota car interface: the per-cycle entry point used by the control loop.

use crate::common::params::Settings;
use crate::selfdrive::car::can::SignalSource;
use crate::selfdrive::car::interfaces::create_common_events;
use crate::selfdrive::car::structs::{GearShifter, VehicleState};
use crate::selfdrive::car::toyota::buttons::{synthesize_button_events, ButtonInputs};
use crate::selfdrive::car::toyota::carstate::CarState;
use crate::selfdrive::car::toyota::engagement::EngagementArbiter;
use crate::selfdrive::car::toyota::steering::SteeringDiagnostics;
use crate::selfdrive::car::toyota::tunes::Tunes;
use crate::selfdrive::car::toyota::values::CarParams;

/// Gears accepted besides drive when the stock cruise controls longitudinal.
const STOCK_LONGITUDINAL_GEARS: [GearShifter; 3] =
    [GearShifter::Sport, GearShifter::Low, GearShifter::Brake];

/// Runs car state estimation and engagement arbitration once per control cycle.
///
/// # Examples
///
/// ```rust
/// use carstate::common::params::Settings;
/// use carstate::selfdrive::car::can::SignalSnapshot;
/// use carstate::selfdrive::car::structs::EventName;
/// use carstate::selfdrive::car::toyota::interface::CarInterface;
/// use carstate::selfdrive::car::toyota::tunes::Tunes;
/// use carstate::selfdrive::car::toyota::values::{Car, CarParams};
///
/// let mut car = CarInterface::new(CarParams::new(Car::Prius), Tunes::default());
/// let mut pt = SignalSnapshot::new();
/// pt.mark_stale("WHEEL_SPEEDS");
///
/// let state = car.update(&pt, &SignalSnapshot::new(), &Settings::default());
/// assert!(!state.can_valid);
/// assert_eq!(state.events[0], EventName::CanError);
/// ```
#[derive(Debug, Clone)]
pub struct CarInterface {
    cs: CarState,
    engagement: EngagementArbiter,
    extra_gears: &'static [GearShifter],
    out: VehicleState,
    frame: u64,
}

impl CarInterface {
    /// Creates a new `CarInterface`.
    ///
    /// # Arguments
    ///
    /// * `cp` - Static vehicle parameters.
    /// * `tunes` - Estimator tuning.
    pub fn new(cp: CarParams, tunes: Tunes) -> Self {
        let extra_gears: &'static [GearShifter] =
            if cp.openpilot_longitudinal_control || cp.enable_gas_interceptor {
                &[]
            } else {
                &STOCK_LONGITUDINAL_GEARS
            };
        Self {
            cs: CarState::new(cp, &tunes),
            engagement: EngagementArbiter::new(),
            extra_gears,
            out: VehicleState::default(),
            frame: 0,
        }
    }

    /// Runs one control cycle and returns the published state.
    ///
    /// # Arguments
    ///
    /// * `pt` - Powertrain bus.
    /// * `cam` - Camera bus.
    /// * `settings` - Settings sampled for this cycle.
    pub fn update<P, C>(&mut self, pt: &P, cam: &C, settings: &Settings) -> VehicleState
    where
        P: SignalSource + ?Sized,
        C: SignalSource + ?Sized,
    {
        let mut ret = self.cs.update(pt, cam, settings);

        ret.button_events = synthesize_button_events(&ButtonInputs {
            prev_cruise_enabled: self.out.cruise_state.enabled,
            cruise_enabled: ret.cruise_state.enabled,
            prev_cruise_buttons: self.cs.prev_cruise_buttons(),
            cruise_buttons: self.cs.cruise_buttons(),
            prev_lkas_enabled: self.out.lkas_enabled,
            lkas_enabled: ret.lkas_enabled,
        });

        let mut events = create_common_events(&ret, self.extra_gears);
        self.engagement.update(&ret, &mut events);
        ret.events = events;

        self.out = ret.clone();
        self.frame += 1;
        ret
    }

    /// Records that the control loop disengaged because of a brake press.
    pub fn notify_disengaged_by_brake(&mut self) {
        self.engagement.notify_disengaged_by_brake();
    }

    /// Steering angle diagnostics of the last cycle.
    pub fn diagnostics(&self) -> SteeringDiagnostics {
        self.cs.steering_diagnostics()
    }

    pub fn car_state(&self) -> &CarState {
        &self.cs
    }

    /// State published by the last cycle.
    pub fn out(&self) -> &VehicleState {
        &self.out
    }

    /// Cycles processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
