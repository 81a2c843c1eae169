//! Toyota/Lexus family table and static vehicle parameters.

use crate::error::{CarError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Bus address of the auxiliary (ZSS) steering angle message.
pub const ZSS_MESSAGE_ID: u32 = 0x23;

/// Raw `PCM_CRUISE.CRUISE_STATE` codes used as cruise button history.
pub struct CruiseButtons;

impl CruiseButtons {
    pub const NONE: i64 = 0;
    pub const ACCEL_CC: i64 = 1;
    pub const DECEL_CC: i64 = 2;
    pub const ACCEL_ACC: i64 = 9;
    pub const DECEL_ACC: i64 = 10;
}

/// `PCM_CRUISE.CRUISE_STATE` while cruise holds the car stopped.
pub const PCM_STANDSTILL: i64 = 7;

/// `PCM_CRUISE_2.LOW_SPEED_LOCKOUT` value when cruise is locked out at low speed.
pub const LOW_SPEED_LOCKOUT: i64 = 2;

/// `EPS_STATUS.LKA_STATE` values where the EPS is standing by or steering normally.
pub const EPS_NOMINAL_STATES: [i64; 2] = [1, 5];

/// `EPS_STATUS.LKA_STATE` values where the EPS refuses steering commands.
pub const EPS_NOT_ALLOWED_STATES: [i64; 2] = [9, 25];

/// `LKAS_HUD.LDA_ON_MESSAGE` codes on cars signalling lane keeping through LTA.
pub const LTA_LKAS_ON: i64 = 1;
pub const LTA_LKAS_OFF: i64 = 2;

/// Steering torque above which the driver is considered to be steering.
pub const STEER_THRESHOLD: f64 = 100.0;

/// How the camera reports the lane keeping button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LkasEncoding {
    /// Single on/off bit in `LKAS_HUD.SET_ME_X01`.
    LegacyBit,
    /// Three-valued code in `LKAS_HUD.LDA_ON_MESSAGE`.
    LtaMessage,
}

/// Capability flags derived from the car family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarInfo {
    /// Toyota Safety Sense 2.0; always carries the accurate torque-sensor angle.
    pub tss2: bool,
    /// The PCM restarts from standstill without a resume command.
    pub no_stop_timer: bool,
    /// Cruise main switch and set speed come from `DSU_CRUISE`.
    pub dsu_cruise: bool,
    pub lkas_encoding: LkasEncoding,
}

const TSS1: CarInfo = CarInfo {
    tss2: false,
    no_stop_timer: false,
    dsu_cruise: false,
    lkas_encoding: LkasEncoding::LegacyBit,
};

const TSS1_HYBRID: CarInfo = CarInfo {
    no_stop_timer: true,
    ..TSS1
};

const TSS1_DSU: CarInfo = CarInfo {
    dsu_cruise: true,
    ..TSS1
};

const TSS2: CarInfo = CarInfo {
    tss2: true,
    no_stop_timer: true,
    dsu_cruise: false,
    lkas_encoding: LkasEncoding::LegacyBit,
};

const TSS2_LTA: CarInfo = CarInfo {
    lkas_encoding: LkasEncoding::LtaMessage,
    ..TSS2
};

/// Supported car families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Car {
    Prius,
    PriusTss2,
    Rav4,
    Rav4h,
    Rav4Tss2,
    Rav4hTss2,
    Rav4Prime,
    Corolla,
    CorollaTss2,
    CorollahTss2,
    Camry,
    Camryh,
    CamryTss2,
    Highlander,
    Highlanderh,
    HighlanderTss2,
    Mirai,
    LexusIs,
    LexusRc,
    LexusEsTss2,
    LexusNxTss2,
}

impl Car {
    /// Every supported family.
    pub const ALL: [Car; 21] = [
        Car::Prius,
        Car::PriusTss2,
        Car::Rav4,
        Car::Rav4h,
        Car::Rav4Tss2,
        Car::Rav4hTss2,
        Car::Rav4Prime,
        Car::Corolla,
        Car::CorollaTss2,
        Car::CorollahTss2,
        Car::Camry,
        Car::Camryh,
        Car::CamryTss2,
        Car::Highlander,
        Car::Highlanderh,
        Car::HighlanderTss2,
        Car::Mirai,
        Car::LexusIs,
        Car::LexusRc,
        Car::LexusEsTss2,
        Car::LexusNxTss2,
    ];

    /// Capability flags of the family.
    pub const fn info(self) -> CarInfo {
        match self {
            Car::Prius | Car::Rav4 | Car::Corolla | Car::Camry => TSS1,
            Car::Rav4h | Car::Camryh | Car::Highlander | Car::Highlanderh => TSS1_HYBRID,
            Car::LexusIs | Car::LexusRc => TSS1_DSU,
            Car::PriusTss2
            | Car::Rav4Tss2
            | Car::Rav4hTss2
            | Car::CorollaTss2
            | Car::CorollahTss2
            | Car::CamryTss2
            | Car::HighlanderTss2
            | Car::LexusEsTss2
            | Car::LexusNxTss2 => TSS2,
            Car::Rav4Prime | Car::Mirai => TSS2_LTA,
        }
    }
}

/// Static vehicle parameters, fixed for the life of a [`CarInterface`](super::interface::CarInterface).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    pub car_fingerprint: Car,
    /// Auxiliary (ZSS) steering angle sensor installed.
    pub has_zss: bool,
    /// Comma pedal gas interceptor installed.
    pub enable_gas_interceptor: bool,
    /// Blind spot monitor messages available.
    pub enable_bsm: bool,
    pub smart_dsu: bool,
    pub openpilot_longitudinal_control: bool,
    /// Scale applied to wheel and set speeds.
    pub wheel_speed_factor: f64,
}

impl Default for CarParams {
    fn default() -> Self {
        Self::new(Car::Corolla)
    }
}

impl CarParams {
    /// Creates parameters for `car` with no optional hardware.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::toyota::values::{Car, CarParams};
    ///
    /// let cp = CarParams::new(Car::Rav4Tss2).with_fingerprint([0x23, 0x2e4]);
    /// assert!(cp.has_zss);
    /// assert!(cp.info().tss2);
    /// ```
    pub fn new(car: Car) -> Self {
        Self {
            car_fingerprint: car,
            has_zss: false,
            enable_gas_interceptor: false,
            enable_bsm: false,
            smart_dsu: false,
            openpilot_longitudinal_control: false,
            wheel_speed_factor: 1.0,
        }
    }

    /// Detects optional sensors from the set of addresses seen on the bus.
    pub fn with_fingerprint(mut self, addresses: impl IntoIterator<Item = u32>) -> Self {
        self.has_zss = addresses.into_iter().any(|address| address == ZSS_MESSAGE_ID);
        self
    }

    /// Capability flags of the configured family.
    pub fn info(&self) -> CarInfo {
        self.car_fingerprint.info()
    }

    /// Parses parameters from TOML; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads parameters from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(CarError::Io)?;
        Self::from_toml_str(&content)
    }
}
