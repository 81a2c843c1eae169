//! Read-only access to the persistent settings store.
//!
//! The store itself lives outside this crate. A control cycle samples it once through
//! [`Settings::sample`]; values may change between cycles and no atomicity is required across keys.

use crate::error::CarError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys read from the settings store.
pub mod keys {
    /// Lane keeping engages independently of cruise control.
    pub const ENABLE_MADS: &str = "EnableMADS";
    /// Cruise engagement also engages lane keeping.
    pub const ACC_MADS_COMBO: &str = "ACCMADSCombo";
    /// Automatic brake hold at standstill.
    pub const AUTOMATIC_BRAKE_HOLD: &str = "AleSato_AutomaticBrakeHold";
    /// Report ACC type 1 on TSS2 cars regardless of the camera.
    pub const STOP_AND_GO_HACK: &str = "StopAndGoHack";
    /// Use the stored following distance instead of the car's.
    pub const GAP_ADJUST_CRUISE: &str = "GapAdjustCruise";
    /// Stored following distance in bars.
    pub const GAP_ADJUST_CRUISE_TR: &str = "GapAdjustCruiseTr";
}

/// Following distance used when the stored value is missing or unreadable.
pub const DEFAULT_GAP_ADJUST_CRUISE_TR: u8 = 3;

/// Read access to a key/value settings store.
pub trait ParamsReader {
    /// Returns the raw value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns `true` only when the stored value is `"1"`.
    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key).as_deref().map(str::trim), Some("1"))
    }
}

/// In-memory settings store.
///
/// # Examples
///
/// ```rust
/// use carstate::common::params::{MemoryParams, ParamsReader};
///
/// let mut params = MemoryParams::new();
/// params.put_bool("EnableMADS", true);
/// assert!(params.get_bool("EnableMADS"));
/// assert!(!params.get_bool("ACCMADSCombo"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryParams {
    values: HashMap<String, String>,
}

impl MemoryParams {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value.
    pub fn put(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Stores a boolean as `"1"` or `"0"`.
    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.put(key, if value { "1" } else { "0" });
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl ParamsReader for MemoryParams {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// One cycle's sample of the settings that drive car state estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Lane keeping engages independently of cruise control.
    pub mads_enabled: bool,
    /// A rising edge of cruise engagement force-enables lane keeping.
    pub acc_mads_combo: bool,
    /// Automatic brake hold feature switch.
    pub automatic_brake_hold: bool,
    /// Report ACC type 1 on TSS2 cars.
    pub stop_and_go_hack: bool,
    /// Use the stored following distance.
    pub gap_adjust_cruise: bool,
    /// Stored following distance in bars.
    pub gap_adjust_cruise_tr: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mads_enabled: false,
            acc_mads_combo: false,
            automatic_brake_hold: false,
            stop_and_go_hack: false,
            gap_adjust_cruise: false,
            gap_adjust_cruise_tr: DEFAULT_GAP_ADJUST_CRUISE_TR,
        }
    }
}

impl Settings {
    /// Samples every setting from `params`.
    ///
    /// Unreadable values fall back to their defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::common::params::{MemoryParams, Settings};
    ///
    /// let mut params = MemoryParams::new();
    /// params.put_bool("AleSato_AutomaticBrakeHold", true);
    /// params.put("GapAdjustCruiseTr", "2");
    ///
    /// let settings = Settings::sample(&params);
    /// assert!(settings.automatic_brake_hold);
    /// assert_eq!(settings.gap_adjust_cruise_tr, 2);
    /// ```
    pub fn sample<P: ParamsReader + ?Sized>(params: &P) -> Self {
        let gap_adjust_cruise_tr = match params.get(keys::GAP_ADJUST_CRUISE_TR) {
            Some(raw) => parse_distance_lines(&raw).unwrap_or_else(|err| {
                warn!("{err}, using {DEFAULT_GAP_ADJUST_CRUISE_TR}");
                DEFAULT_GAP_ADJUST_CRUISE_TR
            }),
            None => DEFAULT_GAP_ADJUST_CRUISE_TR,
        };

        Self {
            mads_enabled: params.get_bool(keys::ENABLE_MADS),
            acc_mads_combo: params.get_bool(keys::ACC_MADS_COMBO),
            automatic_brake_hold: params.get_bool(keys::AUTOMATIC_BRAKE_HOLD),
            stop_and_go_hack: params.get_bool(keys::STOP_AND_GO_HACK),
            gap_adjust_cruise: params.get_bool(keys::GAP_ADJUST_CRUISE),
            gap_adjust_cruise_tr,
        }
    }
}

fn parse_distance_lines(raw: &str) -> Result<u8, CarError> {
    match raw.trim().parse::<u8>() {
        Ok(lines) if (1..=4).contains(&lines) => Ok(lines),
        _ => Err(CarError::InvalidSetting {
            key: keys::GAP_ADJUST_CRUISE_TR.to_string(),
            value: raw.to_string(),
        }),
    }
}
