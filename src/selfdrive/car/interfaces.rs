//! Pieces shared by every car port: speed estimation and the common safety alerts.

use crate::common::conversions::KPH_TO_MS;
use crate::common::kalman::KF1D;
use crate::common::realtime::DT_CTRL;
use crate::selfdrive::car::structs::{EventName, GearShifter, VehicleState, WheelSpeeds};
use ndarray::arr2;

/// Raw speed jump (m/s) above which the filter snaps to the measurement instead of integrating it.
const SPEED_RESET_JUMP: f64 = 2.0;

/// Raw wheel speed below which the car is considered stopped (m/s).
pub const STANDSTILL_SPEED: f64 = 0.001;

/// Estimates ego speed and acceleration from wheel speeds.
#[derive(Clone, Debug)]
pub struct SpeedEstimator {
    /// Converts raw wheel speed units to m/s.
    wheel_factor: f64,
    v_ego_kf: KF1D,
}

impl SpeedEstimator {
    /// Creates a new `SpeedEstimator` for wheel speeds reported in km/h scaled by `wheel_speed_factor`.
    pub fn new(wheel_speed_factor: f64) -> Self {
        let v_ego_kf = KF1D::new(
            arr2(&[[0.0], [0.0]]),
            arr2(&[[1.0, DT_CTRL], [0.0, 1.0]]),
            arr2(&[[1.0, 0.0]]),
            arr2(&[[0.12287673], [0.29666309]]),
        );
        Self {
            wheel_factor: KPH_TO_MS * wheel_speed_factor,
            v_ego_kf,
        }
    }

    /// Scales raw wheel speeds to m/s.
    pub fn wheel_speeds(&self, fl: f64, fr: f64, rl: f64, rr: f64) -> WheelSpeeds {
        WheelSpeeds {
            fl: fl * self.wheel_factor,
            fr: fr * self.wheel_factor,
            rl: rl * self.wheel_factor,
            rr: rr * self.wheel_factor,
        }
    }

    /// Filters the raw speed, returning `(v_ego, a_ego)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::interfaces::SpeedEstimator;
    ///
    /// let mut speed = SpeedEstimator::new(1.0);
    /// // A large jump snaps the filter to the measurement
    /// let (v_ego, a_ego) = speed.update(20.0);
    /// assert!((v_ego - 20.0).abs() < 1e-9);
    /// assert!(a_ego.abs() < 1e-9);
    /// ```
    pub fn update(&mut self, v_ego_raw: f64) -> (f64, f64) {
        let (v_ego, _) = self.v_ego_kf.state();
        if (v_ego_raw - v_ego).abs() > SPEED_RESET_JUMP {
            self.v_ego_kf.reset(v_ego_raw);
        }
        self.v_ego_kf.update(v_ego_raw)
    }
}

/// Safety alerts every car port raises from its state.
///
/// `extra_gears` lists gears accepted besides drive.
pub fn create_common_events(cs: &VehicleState, extra_gears: &[GearShifter]) -> Vec<EventName> {
    let mut events = Vec::new();

    if !cs.can_valid {
        events.push(EventName::CanError);
    }
    if cs.door_open {
        events.push(EventName::DoorOpen);
    }
    if cs.seatbelt_unlatched {
        events.push(EventName::SeatbeltNotLatched);
    }
    if cs.gear_shifter != GearShifter::Drive && !extra_gears.contains(&cs.gear_shifter) {
        events.push(EventName::WrongGear);
    }
    if cs.esp_disabled {
        events.push(EventName::EspDisabled);
    }
    if cs.stock_aeb {
        events.push(EventName::StockAeb);
    }
    if cs.steer_warning {
        events.push(EventName::SteerTempUnavailable);
    }

    events
}
