//! Steering angle fusion.
//!
//! Three sources are available depending on the car:
//!
//! - the stock steering angle sensor (`STEER_ANGLE_SENSOR`), always present but coarse;
//! - the torque-sensor angle (`STEER_TORQUE_SENSOR.STEER_ANGLE`), accurate but zeroed wherever
//!   the wheel was at power-on, so it needs an offset against the stock sensor;
//! - an auxiliary ZSS sensor (`SECONDARY_STEER_ANGLE`), re-zeroed against the stock sensor on
//!   every cruise engagement and dropped when it disagrees with the stock sensor too often.

use crate::error::CarError;
use crate::selfdrive::car::structs::AngleSource;
use crate::selfdrive::car::toyota::tunes::Tunes;
use log::{debug, info, warn};

/// Readings below this magnitude are treated as "not reporting".
const ANGLE_EPSILON: f64 = 1e-3;

/// Raw steering angle readings for one cycle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleReadings {
    /// Whole-degree part of the stock angle.
    pub stock_angle: f64,
    /// Fractional part of the stock angle.
    pub stock_fraction: f64,
    /// Torque-sensor angle, zero while unavailable.
    pub torque_angle: f64,
    /// Auxiliary (ZSS) angle, zero on cars without the sensor.
    pub zss_angle: f64,
}

impl AngleReadings {
    /// Stock angle including its fractional part.
    pub fn stock(&self) -> f64 {
        self.stock_angle + self.stock_fraction
    }
}

/// Offset between a secondary angle source and the stock sensor.
///
/// The offset is latched the first time both readings are nonzero and stays fixed until
/// [`AngleOffset::invalidate`] is called.
///
/// # Examples
///
/// ```rust
/// use carstate::selfdrive::car::toyota::steering::AngleOffset;
///
/// let mut offset = AngleOffset::pending();
/// assert!(!offset.calibrate(0.0, 3.0)); // stock reads exactly zero, defer
/// assert!(offset.calibrate(10.0, 10.5));
/// assert_eq!(offset.value(), 0.5);
/// assert!(!offset.calibrate(20.0, 30.0)); // already latched
/// assert_eq!(offset.apply(12.5), 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleOffset {
    value: f64,
    needs_update: bool,
}

impl AngleOffset {
    /// An offset that still has to be measured.
    pub fn pending() -> Self {
        Self {
            value: 0.0,
            needs_update: true,
        }
    }

    /// An offset known up front.
    pub fn known(value: f64) -> Self {
        Self {
            value,
            needs_update: false,
        }
    }

    /// Last latched value, zero before the first calibration.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_known(&self) -> bool {
        !self.needs_update
    }

    /// Requests a fresh calibration. The previous value stays in use until then.
    pub fn invalidate(&mut self) {
        self.needs_update = true;
    }

    /// Latches `target - reference` if a calibration is pending and both readings are nonzero.
    ///
    /// Returns `true` when the offset was latched by this call.
    pub fn calibrate(&mut self, reference: f64, target: f64) -> bool {
        if !self.needs_update || reference.abs() <= ANGLE_EPSILON || target.abs() <= ANGLE_EPSILON {
            return false;
        }
        self.value = target - reference;
        self.needs_update = false;
        true
    }

    /// Removes the offset from a raw reading.
    pub fn apply(&self, raw: f64) -> f64 {
        raw - self.value
    }
}

/// Fused steering angle for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringEstimate {
    pub angle_deg: f64,
    pub source: AngleSource,
    pub out_of_tolerance: u32,
}

/// Snapshot of every angle source, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringDiagnostics {
    pub stock: f64,
    pub torque: f64,
    pub zss: f64,
    pub out_of_tolerance: u32,
    pub selected: f64,
    pub source: AngleSource,
}

impl SteeringDiagnostics {
    /// Writes the snapshot to the log at info level.
    pub fn log(&self) {
        info!(
            "steering angle: zss={:.2} torque={:.2} stock={:.2} out_of_tolerance={} using {} ({:.2})",
            self.zss, self.torque, self.stock, self.out_of_tolerance, self.source, self.selected
        );
    }
}

/// Fuses the stock, torque-sensor and auxiliary steering angles.
#[derive(Debug, Clone)]
pub struct SteeringAngleEstimator {
    has_zss: bool,
    tolerance_deg: f64,
    max_out_of_tolerance: u32,
    accurate_angle_seen: bool,
    torque_offset: AngleOffset,
    zss_offset: AngleOffset,
    cruise_active_previous: bool,
    out_of_tolerance: u32,
    diagnostics: SteeringDiagnostics,
}

impl SteeringAngleEstimator {
    /// Creates a new `SteeringAngleEstimator`.
    ///
    /// # Arguments
    ///
    /// * `has_zss` - The car carries the auxiliary angle sensor.
    /// * `accurate_angle_known` - The torque-sensor angle is known to be present and already zeroed
    ///   against the stock sensor (TSS2 cars).
    /// * `tunes` - Tolerance and lockout settings.
    pub fn new(has_zss: bool, accurate_angle_known: bool, tunes: &Tunes) -> Self {
        Self {
            has_zss,
            tolerance_deg: tunes.steer_angle_tolerance_deg,
            max_out_of_tolerance: tunes.max_out_of_tolerance,
            accurate_angle_seen: accurate_angle_known,
            torque_offset: if accurate_angle_known {
                AngleOffset::known(0.0)
            } else {
                AngleOffset::pending()
            },
            zss_offset: AngleOffset::pending(),
            cruise_active_previous: false,
            out_of_tolerance: 0,
            diagnostics: SteeringDiagnostics::default(),
        }
    }

    /// Runs one cycle of angle fusion.
    ///
    /// # Arguments
    ///
    /// * `readings` - Raw angles of this cycle.
    /// * `cruise_active` - Cruise is engaged this cycle.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::structs::AngleSource;
    /// use carstate::selfdrive::car::toyota::steering::{AngleReadings, SteeringAngleEstimator};
    /// use carstate::selfdrive::car::toyota::tunes::Tunes;
    ///
    /// let mut estimator = SteeringAngleEstimator::new(false, false, &Tunes::default());
    /// let readings = AngleReadings { stock_angle: 10.0, ..Default::default() };
    ///
    /// let estimate = estimator.update(&readings, false);
    /// assert_eq!(estimate.angle_deg, 10.0);
    /// assert_eq!(estimate.source, AngleSource::Primary);
    /// ```
    pub fn update(&mut self, readings: &AngleReadings, cruise_active: bool) -> SteeringEstimate {
        let stock = readings.stock();

        if readings.torque_angle.abs() > ANGLE_EPSILON {
            self.accurate_angle_seen = true;
        }

        if cruise_active && !self.cruise_active_previous {
            self.zss_offset.invalidate();
            self.out_of_tolerance = 0;
        }
        self.cruise_active_previous = cruise_active;

        let mut torque = self.diagnostics.torque;
        if self.accurate_angle_seen {
            if self.torque_offset.calibrate(stock, readings.torque_angle) {
                debug!("torque angle offset latched at {:.3} deg", self.torque_offset.value());
            }
            torque = self.torque_offset.apply(readings.torque_angle);
        }

        let mut zss = self.diagnostics.zss;
        let (angle_deg, source) = if self.has_zss {
            if self.zss_offset.calibrate(stock, readings.zss_angle) {
                debug!("zss angle offset latched at {:.3} deg", self.zss_offset.value());
            }
            zss = self.zss_offset.apply(readings.zss_angle);
            self.select_zss(stock, zss, cruise_active)
        } else if self.accurate_angle_seen && self.torque_offset.is_known() {
            // Torque sensor angle is untrusted until its offset is latched.
            (torque, AngleSource::Tertiary)
        } else {
            (stock, AngleSource::Primary)
        };

        self.diagnostics = SteeringDiagnostics {
            stock,
            torque,
            zss,
            out_of_tolerance: self.out_of_tolerance,
            selected: angle_deg,
            source,
        };

        SteeringEstimate {
            angle_deg,
            source,
            out_of_tolerance: self.out_of_tolerance,
        }
    }

    fn select_zss(&mut self, stock: f64, zss: f64, cruise_active: bool) -> (f64, AngleSource) {
        if self.out_of_tolerance >= self.max_out_of_tolerance {
            return (stock, AngleSource::Primary);
        }

        match self.check_zss(stock, zss) {
            Ok(angle) => (angle, AngleSource::Secondary),
            Err(CarError::ToleranceExceeded { difference, .. }) => {
                if cruise_active {
                    self.out_of_tolerance += 1;
                    if self.out_of_tolerance == self.max_out_of_tolerance {
                        warn!(
                            "zss disagreed with stock angle {} times (last {:.2} deg), using stock until re-engaged",
                            self.out_of_tolerance, difference
                        );
                    }
                }
                (stock, AngleSource::Primary)
            }
            Err(_) => (stock, AngleSource::Primary),
        }
    }

    fn check_zss(&self, stock: f64, zss: f64) -> Result<f64, CarError> {
        if !self.zss_offset.is_known() {
            return Err(CarError::SensorUnavailable(AngleSource::Secondary));
        }
        let difference = (stock - zss).abs();
        if difference > self.tolerance_deg {
            return Err(CarError::ToleranceExceeded {
                difference,
                limit: self.tolerance_deg,
            });
        }
        Ok(zss)
    }

    /// Diagnostics of the last cycle.
    pub fn diagnostics(&self) -> SteeringDiagnostics {
        self.diagnostics
    }

    pub fn out_of_tolerance(&self) -> u32 {
        self.out_of_tolerance
    }

    pub fn accurate_angle_seen(&self) -> bool {
        self.accurate_angle_seen
    }

    pub fn torque_offset(&self) -> AngleOffset {
        self.torque_offset
    }

    pub fn zss_offset(&self) -> AngleOffset {
        self.zss_offset
    }
}
