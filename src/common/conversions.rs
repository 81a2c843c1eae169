//! Unit conversion factors.

/// Miles per hour to meters per second.
pub const MPH_TO_MS: f64 = 0.44704;
/// Kilometers per hour to meters per second.
pub const KPH_TO_MS: f64 = 1.0 / 3.6;
/// Meters per second to kilometers per hour.
pub const MS_TO_KPH: f64 = 3.6;
