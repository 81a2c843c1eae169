//! Error types for car state estimation.
//!
//! Nothing raised here is fatal to a control cycle. Per-cycle code maps every variant to a defined
//! fallback value; only configuration loading hands errors back to the caller.

use crate::selfdrive::car::structs::AngleSource;
use thiserror::Error;

/// Car state error type
#[derive(Error, Debug)]
pub enum CarError {
    /// The angle source has no calibrated offset yet
    #[error("{0} steering angle has no calibrated offset")]
    SensorUnavailable(AngleSource),

    /// Two fused angle sources disagree beyond the allowed tolerance
    #[error("steering angle sources disagree by {difference:.2} deg (limit {limit:.2} deg)")]
    ToleranceExceeded { difference: f64, limit: f64 },

    /// One or more checked bus messages are not fresh
    #[error("stale bus messages: {}", .0.join(", "))]
    StaleBus(Vec<String>),

    /// The gear packet carried a code with no known gear
    #[error("unrecognized gear code: {0}")]
    UnknownGear(i64),

    /// A stored setting could not be interpreted
    #[error("invalid value {value:?} for setting {key}")]
    InvalidSetting { key: String, value: String },

    /// TOML configuration could not be parsed
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CarError>;
