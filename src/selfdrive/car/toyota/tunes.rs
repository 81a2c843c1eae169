//! Tunable constants of the estimators, loadable from TOML.

use crate::common::conversions::MPH_TO_MS;
use crate::error::{CarError, Result};
use crate::selfdrive::car::toyota::values::STEER_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Estimator tuning.
///
/// # Examples
///
/// ```rust
/// use carstate::selfdrive::car::toyota::tunes::Tunes;
///
/// let tunes = Tunes::from_toml_str("brakehold_cycles = 200").unwrap();
/// assert_eq!(tunes.brakehold_cycles, 200);
/// assert_eq!(tunes.steer_angle_tolerance_deg, 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunes {
    /// Largest accepted disagreement between the auxiliary and stock angle (deg).
    pub steer_angle_tolerance_deg: f64,
    /// Out-of-tolerance cycles, counted while engaged, before the auxiliary sensor is locked out.
    pub max_out_of_tolerance: u32,
    /// Cycles at standstill before automatic brake hold engages.
    pub brakehold_cycles: u32,
    /// Minimum speed for an automatic lane change (m/s).
    pub lane_change_min_speed: f64,
    /// Driver torque above which the wheel counts as held.
    pub steer_threshold: f64,
    /// Interval between steering diagnostics log lines (s).
    pub diagnostics_period_s: f64,
}

impl Default for Tunes {
    fn default() -> Self {
        Self {
            steer_angle_tolerance_deg: 4.0,
            max_out_of_tolerance: 10,
            brakehold_cycles: 300,
            lane_change_min_speed: 30.0 * MPH_TO_MS,
            steer_threshold: STEER_THRESHOLD,
            diagnostics_period_s: 1.0,
        }
    }
}

impl Tunes {
    /// Parses tunes from TOML; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads tunes from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(CarError::Io)?;
        Self::from_toml_str(&content)
    }
}
