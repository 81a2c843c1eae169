//! Per-cycle vehicle state estimation for Toyota and Lexus cars.

use crate::common::params::Settings;
use crate::common::realtime::cycles_per;
use crate::error::CarError;
use crate::selfdrive::car::can::{check_freshness, SignalSource};
use crate::selfdrive::car::interfaces::{SpeedEstimator, STANDSTILL_SPEED};
use crate::selfdrive::car::structs::{GearShifter, VehicleState};
use crate::selfdrive::car::toyota::brake_hold::{BrakeHoldGovernor, BrakeHoldInputs};
use crate::selfdrive::car::toyota::cruise::{CruiseReadings, CruiseStateTracker};
use crate::selfdrive::car::toyota::lane_keep::{LaneKeepArbiter, LaneKeepInputs, SteerStatus};
use crate::selfdrive::car::toyota::steering::{
    AngleReadings, SteeringAngleEstimator, SteeringDiagnostics,
};
use crate::selfdrive::car::toyota::tunes::Tunes;
use crate::selfdrive::car::toyota::values::{CarInfo, CarParams, LkasEncoding};
use log::{debug, info, warn};

/// Interceptor reading above which the gas pedal counts as pressed.
const INTERCEPTOR_GAS_THRESHOLD: f64 = 15.0;

/// `PRE_COLLISION.FORCE` below which the stock AEB is braking.
const AEB_FORCE_THRESHOLD: f64 = -1e-5;

/// `STEERING_LEVERS.TURN_SIGNALS` values.
const TURN_SIGNAL_LEFT: f64 = 1.0;
const TURN_SIGNAL_RIGHT: f64 = 2.0;
const TURN_SIGNAL_NONE: f64 = 3.0;

/// Maps a `GEAR_PACKET.GEAR` code to a gear.
///
/// # Examples
///
/// ```rust
/// use carstate::selfdrive::car::structs::GearShifter;
/// use carstate::selfdrive::car::toyota::carstate::parse_gear_shifter;
///
/// assert_eq!(parse_gear_shifter(32).unwrap(), GearShifter::Park);
/// assert!(parse_gear_shifter(4).is_err());
/// ```
pub fn parse_gear_shifter(code: i64) -> Result<GearShifter, CarError> {
    match code {
        0 => Ok(GearShifter::Drive),
        1 => Ok(GearShifter::Sport),
        8 => Ok(GearShifter::Neutral),
        16 => Ok(GearShifter::Reverse),
        32 => Ok(GearShifter::Park),
        other => Err(CarError::UnknownGear(other)),
    }
}

/// Powertrain bus messages that must be fresh for the state to be valid.
fn powertrain_checks(cp: &CarParams, info: &CarInfo) -> Vec<&'static str> {
    let mut checks = vec![
        "GEAR_PACKET",
        "LIGHT_STALK",
        "STEERING_LEVERS",
        "SEATS_DOORS",
        "ESP_CONTROL",
        "EPS_STATUS",
        "BRAKE_MODULE",
        "GAS_PEDAL",
        "WHEEL_SPEEDS",
        "STEER_ANGLE_SENSOR",
        "PCM_CRUISE",
        "STEER_TORQUE_SENSOR",
        "PCM_CRUISE_SM",
    ];
    checks.push(if info.dsu_cruise { "DSU_CRUISE" } else { "PCM_CRUISE_2" });
    if cp.has_zss {
        checks.push("SECONDARY_STEER_ANGLE");
    }
    if cp.enable_gas_interceptor {
        checks.push("GAS_SENSOR");
    }
    if cp.enable_bsm {
        checks.push("BSM");
    }
    if cp.smart_dsu {
        checks.push("SDSU");
    }
    checks
}

/// Camera bus messages that must be fresh for the state to be valid.
fn camera_checks(info: &CarInfo) -> Vec<&'static str> {
    let mut checks = vec!["STEERING_LKA", "PRE_COLLISION"];
    if info.tss2 {
        checks.push("ACC_CONTROL");
        checks.push("PRE_COLLISION_2");
    }
    checks
}

/// Builds the normalized [`VehicleState`] from the powertrain and camera buses.
///
/// Owns every estimator with state that persists across cycles; a single instance must see every
/// cycle in order.
#[derive(Debug, Clone)]
pub struct CarState {
    cp: CarParams,
    info: CarInfo,
    steer_threshold: f64,
    lane_change_min_speed: f64,
    diagnostics_period: u64,
    pt_checks: Vec<&'static str>,
    cam_checks: Vec<&'static str>,

    speed: SpeedEstimator,
    steering: SteeringAngleEstimator,
    cruise: CruiseStateTracker,
    lane_keep: LaneKeepArbiter,
    brake_hold: BrakeHoldGovernor,

    automatic_lane_change: bool,
    steer_not_allowed: bool,
    can_valid: bool,
    count: u64,
}

impl CarState {
    /// Creates a new `CarState`.
    ///
    /// # Arguments
    ///
    /// * `cp` - Static vehicle parameters.
    /// * `tunes` - Estimator tuning.
    pub fn new(cp: CarParams, tunes: &Tunes) -> Self {
        let info = cp.info();
        Self {
            steer_threshold: tunes.steer_threshold,
            lane_change_min_speed: tunes.lane_change_min_speed,
            diagnostics_period: cycles_per(tunes.diagnostics_period_s),
            pt_checks: powertrain_checks(&cp, &info),
            cam_checks: camera_checks(&info),
            speed: SpeedEstimator::new(cp.wheel_speed_factor),
            steering: SteeringAngleEstimator::new(cp.has_zss, info.tss2, tunes),
            cruise: CruiseStateTracker::new(info, cp.enable_gas_interceptor, cp.wheel_speed_factor),
            lane_keep: LaneKeepArbiter::new(info.lkas_encoding, tunes.lane_change_min_speed),
            brake_hold: BrakeHoldGovernor::new(tunes.brakehold_cycles),
            automatic_lane_change: true,
            steer_not_allowed: false,
            can_valid: true,
            count: 0,
            cp,
            info,
        }
    }

    /// Reads one cycle of bus signals and returns the vehicle state.
    ///
    /// Button and engagement events are left empty; [`CarInterface`](super::interface::CarInterface)
    /// fills them in.
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
        let mut ret = VehicleState {
            can_valid: self.check_buses(pt, cam),
            ..Default::default()
        };

        ret.door_open = ["DOOR_OPEN_FL", "DOOR_OPEN_FR", "DOOR_OPEN_RL", "DOOR_OPEN_RR"]
            .iter()
            .any(|door| pt.value_or("SEATS_DOORS", door, 1.0) != 0.0);
        ret.seatbelt_unlatched = pt.value_or("SEATS_DOORS", "SEATBELT_DRIVER_UNLATCHED", 1.0) != 0.0;

        ret.brake_pressed = pt.value("BRAKE_MODULE", "BRAKE_PRESSED") != 0.0;
        ret.brake_hold_active = pt.value_or("ESP_CONTROL", "BRAKE_HOLD_ACTIVE", 1.0) == 1.0;
        ret.brake_lights = pt.value_or("ESP_CONTROL", "BRAKE_LIGHTS_ACC", 1.0) != 0.0
            || ret.brake_pressed
            || ret.brake_hold_active;

        if self.cp.enable_gas_interceptor {
            ret.gas = (pt.value("GAS_SENSOR", "INTERCEPTOR_GAS")
                + pt.value("GAS_SENSOR", "INTERCEPTOR_GAS2"))
                / 2.0;
            ret.gas_pressed = ret.gas > INTERCEPTOR_GAS_THRESHOLD;
        } else {
            ret.gas = pt.value("GAS_PEDAL", "GAS_PEDAL");
            ret.gas_pressed = pt.value_or("PCM_CRUISE", "GAS_RELEASED", 1.0) == 0.0;
        }

        ret.wheel_speeds = self.speed.wheel_speeds(
            pt.value("WHEEL_SPEEDS", "WHEEL_SPEED_FL"),
            pt.value("WHEEL_SPEEDS", "WHEEL_SPEED_FR"),
            pt.value("WHEEL_SPEEDS", "WHEEL_SPEED_RL"),
            pt.value("WHEEL_SPEEDS", "WHEEL_SPEED_RR"),
        );
        ret.v_ego_raw = ret.wheel_speeds.mean();
        (ret.v_ego, ret.a_ego) = self.speed.update(ret.v_ego_raw);
        ret.standstill = ret.v_ego_raw < STANDSTILL_SPEED;
        ret.below_lane_change_speed = ret.v_ego < self.lane_change_min_speed;
        ret.automatic_lane_change = self.automatic_lane_change;

        let cruise_active = pt.value("PCM_CRUISE", "CRUISE_ACTIVE") != 0.0;
        let readings = AngleReadings {
            stock_angle: pt.value("STEER_ANGLE_SENSOR", "STEER_ANGLE"),
            stock_fraction: pt.value("STEER_ANGLE_SENSOR", "STEER_FRACTION"),
            torque_angle: pt.value("STEER_TORQUE_SENSOR", "STEER_ANGLE"),
            zss_angle: if self.cp.has_zss {
                pt.value("SECONDARY_STEER_ANGLE", "ZORRO_STEER")
            } else {
                0.0
            },
        };
        let estimate = self.steering.update(&readings, cruise_active);
        ret.steering_angle_deg = estimate.angle_deg;
        ret.steer_source = estimate.source;
        if self.count % self.diagnostics_period == 0 {
            self.steering.diagnostics().log();
        }
        ret.steering_rate_deg = pt.value("STEER_ANGLE_SENSOR", "STEER_RATE");

        let gear_code = pt.value("GEAR_PACKET", "GEAR") as i64;
        ret.gear_shifter = parse_gear_shifter(gear_code).unwrap_or_else(|err| {
            debug!("{err}");
            GearShifter::Unknown
        });

        let turn_signals = pt.value_or("STEERING_LEVERS", "TURN_SIGNALS", TURN_SIGNAL_NONE);
        ret.left_blinker = turn_signals == TURN_SIGNAL_LEFT;
        ret.right_blinker = turn_signals == TURN_SIGNAL_RIGHT;

        ret.steering_torque = pt.value("STEER_TORQUE_SENSOR", "STEER_TORQUE_DRIVER");
        ret.steering_torque_eps = pt.value("STEER_TORQUE_SENSOR", "STEER_TORQUE_EPS");
        ret.steering_pressed = ret.steering_torque.abs() > self.steer_threshold;

        let cruise_message = if self.info.dsu_cruise { "DSU_CRUISE" } else { "PCM_CRUISE_2" };
        let cruise_readings = CruiseReadings {
            main_on: pt.value(cruise_message, "MAIN_ON") != 0.0,
            set_speed: pt.value(cruise_message, "SET_SPEED"),
            cruise_active,
            cruise_state: pt.value("PCM_CRUISE", "CRUISE_STATE") as i64,
            low_speed_lockout: pt.value("PCM_CRUISE_2", "LOW_SPEED_LOCKOUT") as i64,
            acc_type: cam.value("ACC_CONTROL", "ACC_TYPE") as i64,
        };
        ret.cruise_state = self.cruise.update(&cruise_readings, settings.stop_and_go_hack);
        if self.cruise.just_engaged() {
            debug!("cruise engaged at {:.2} m/s", ret.v_ego);
        }

        ret.gap_adjust_cruise_tr = if self.info.tss2 && settings.gap_adjust_cruise {
            settings.gap_adjust_cruise_tr
        } else {
            pt.value("PCM_CRUISE_SM", "DISTANCE_LINES") as u8
        };

        let lkas_signal = match self.info.lkas_encoding {
            LkasEncoding::LtaMessage => "LDA_ON_MESSAGE",
            LkasEncoding::LegacyBit => "SET_ME_X01",
        };
        let lane_keep = self.lane_keep.update(
            &LaneKeepInputs {
                cruise_available: ret.cruise_state.available,
                lkas_button: cam.value("LKAS_HUD", lkas_signal) as i64,
                brake_pressed: ret.brake_pressed,
                cancel_edge: self.cruise.cancel_edge(),
                cruise_enabled: ret.cruise_state.enabled,
                mads_enabled: settings.mads_enabled,
                acc_mads_combo: settings.acc_mads_combo,
            },
            &SteerStatus {
                eps_state: pt.value("EPS_STATUS", "LKA_STATE") as i64,
                v_ego: ret.v_ego,
                left_blinker: ret.left_blinker,
                right_blinker: ret.right_blinker,
                automatic_lane_change: self.automatic_lane_change,
            },
        );
        ret.lkas_enabled = lane_keep.enabled;
        ret.steer_warning = lane_keep.steer_warning;
        if lane_keep.enabled {
            self.steer_not_allowed = lane_keep.steer_not_allowed;
        }

        ret.generic_toggle = pt.value("LIGHT_STALK", "AUTO_HIGH_BEAM") != 0.0;
        ret.stock_aeb = cam.value("PRE_COLLISION", "PRECOLLISION_ACTIVE") != 0.0
            && cam.value("PRE_COLLISION", "FORCE") < AEB_FORCE_THRESHOLD;
        ret.esp_disabled = pt.value_or("ESP_CONTROL", "TC_DISABLED", 1.0) != 0.0;

        if self.cp.enable_bsm {
            ret.left_blindspot = pt.value("BSM", "L_ADJACENT") == 1.0
                || pt.value("BSM", "L_APPROACHING") == 1.0;
            ret.right_blindspot = pt.value("BSM", "R_ADJACENT") == 1.0
                || pt.value("BSM", "R_APPROACHING") == 1.0;
        }

        ret.brakehold_governor = self.brake_hold.update(&BrakeHoldInputs {
            standstill: ret.standstill,
            cruise_available: ret.cruise_state.available,
            cruise_enabled: ret.cruise_state.enabled,
            gas_pressed: ret.gas_pressed,
            brake_pressed: ret.brake_pressed,
            gear: ret.gear_shifter,
            feature_enabled: settings.automatic_brake_hold,
        });

        self.count += 1;
        ret
    }

    fn check_buses<P, C>(&mut self, pt: &P, cam: &C) -> bool
    where
        P: SignalSource + ?Sized,
        C: SignalSource + ?Sized,
    {
        let result = check_freshness(pt, &self.pt_checks).and(check_freshness(cam, &self.cam_checks));
        let valid = result.is_ok();
        if valid != self.can_valid {
            match result {
                Err(err) => warn!("bus invalid: {err}"),
                Ok(()) => info!("bus valid again"),
            }
        }
        self.can_valid = valid;
        valid
    }

    /// Enables or disables automatic lane changes.
    pub fn set_automatic_lane_change(&mut self, enabled: bool) {
        self.automatic_lane_change = enabled;
    }

    /// Lane keeping flag computed by the last cycle.
    pub fn lkas_enabled(&self) -> bool {
        self.lane_keep.enabled()
    }

    /// Raw cruise button code of the last cycle.
    pub fn cruise_buttons(&self) -> i64 {
        self.cruise.buttons()
    }

    /// Raw cruise button code of the cycle before the last one.
    pub fn prev_cruise_buttons(&self) -> i64 {
        self.cruise.prev_buttons()
    }

    /// The EPS refused steering the last time lane keeping was enabled.
    pub fn steer_not_allowed(&self) -> bool {
        self.steer_not_allowed
    }

    pub fn low_speed_lockout(&self) -> bool {
        self.cruise.low_speed_lockout()
    }

    pub fn acc_type(&self) -> i64 {
        self.cruise.acc_type()
    }

    pub fn resume_available(&self) -> bool {
        self.cruise.resume_available()
    }

    /// Steering angle diagnostics of the last cycle.
    pub fn steering_diagnostics(&self) -> SteeringDiagnostics {
        self.steering.diagnostics()
    }

    pub fn params(&self) -> &CarParams {
        &self.cp
    }

    /// Cycles processed so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}
