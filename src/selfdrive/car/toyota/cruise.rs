//! Cruise control state normalization.

use crate::common::conversions::KPH_TO_MS;
use crate::selfdrive::car::structs::CruiseState;
use crate::selfdrive::car::toyota::values::{CarInfo, LOW_SPEED_LOCKOUT, PCM_STANDSTILL};

/// Raw cruise signals for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CruiseReadings {
    /// Main switch (`PCM_CRUISE_2.MAIN_ON` or `DSU_CRUISE.MAIN_ON`).
    pub main_on: bool,
    /// Set speed as reported, in km/h.
    pub set_speed: f64,
    /// `PCM_CRUISE.CRUISE_ACTIVE`.
    pub cruise_active: bool,
    /// `PCM_CRUISE.CRUISE_STATE`, also the raw cruise button code.
    pub cruise_state: i64,
    /// `PCM_CRUISE_2.LOW_SPEED_LOCKOUT`.
    pub low_speed_lockout: i64,
    /// `ACC_CONTROL.ACC_TYPE` from the camera (TSS2 only).
    pub acc_type: i64,
}

/// Tracks cruise availability, engagement, standstill and the raw button code history.
#[derive(Debug, Clone)]
pub struct CruiseStateTracker {
    info: CarInfo,
    /// Standstill never reported by the PCM.
    standstill_suppressed: bool,
    speed_factor: f64,
    enabled: bool,
    enabled_previous: bool,
    buttons: Option<i64>,
    prev_buttons: i64,
    resume_available: bool,
    acc_type: i64,
    low_speed_lockout: bool,
}

impl CruiseStateTracker {
    /// Creates a new `CruiseStateTracker`.
    ///
    /// # Arguments
    ///
    /// * `info` - Capability flags of the car family.
    /// * `gas_interceptor` - A gas interceptor is installed.
    /// * `wheel_speed_factor` - Scale applied to the PCM set speed.
    pub fn new(info: CarInfo, gas_interceptor: bool, wheel_speed_factor: f64) -> Self {
        let speed_factor = if info.dsu_cruise {
            KPH_TO_MS
        } else {
            wheel_speed_factor * KPH_TO_MS
        };
        Self {
            info,
            standstill_suppressed: info.no_stop_timer || gas_interceptor,
            speed_factor,
            enabled: false,
            enabled_previous: false,
            buttons: None,
            prev_buttons: 0,
            resume_available: false,
            acc_type: 1,
            low_speed_lockout: false,
        }
    }

    /// Normalizes one cycle of cruise signals.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::toyota::cruise::{CruiseReadings, CruiseStateTracker};
    /// use carstate::selfdrive::car::toyota::values::Car;
    ///
    /// let mut tracker = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
    /// let readings = CruiseReadings { main_on: true, cruise_state: 7, ..Default::default() };
    ///
    /// let cruise = tracker.update(&readings, false);
    /// assert!(cruise.available);
    /// assert!(cruise.standstill);
    /// ```
    pub fn update(&mut self, readings: &CruiseReadings, stop_and_go_hack: bool) -> CruiseState {
        let code = readings.cruise_state;
        self.prev_buttons = self.buttons.unwrap_or(code);
        self.buttons = Some(code);

        self.enabled_previous = self.enabled;
        self.enabled = readings.cruise_active;
        if self.enabled {
            self.resume_available = true;
        }

        if self.info.tss2 {
            self.acc_type = if stop_and_go_hack { 1 } else { readings.acc_type };
        }

        // Some TSS2 cars report a permanent lockout; only trust it with ACC type 1.
        if (!self.info.tss2 && !self.info.dsu_cruise) || (self.info.tss2 && self.acc_type == 1) {
            self.low_speed_lockout = readings.low_speed_lockout == LOW_SPEED_LOCKOUT;
        }

        CruiseState {
            available: readings.main_on,
            enabled: self.enabled,
            standstill: !self.standstill_suppressed && code == PCM_STANDSTILL,
            non_adaptive: (1..=6).contains(&code),
            speed: readings.set_speed * self.speed_factor,
        }
    }

    /// Raw button code of this cycle.
    pub fn buttons(&self) -> i64 {
        self.buttons.unwrap_or(0)
    }

    /// Raw button code of the previous cycle, equal to the current one on the first cycle.
    pub fn prev_buttons(&self) -> i64 {
        self.prev_buttons
    }

    /// Cruise button released to zero this cycle.
    pub fn cancel_edge(&self) -> bool {
        self.prev_buttons != 0 && self.buttons() == 0
    }

    /// Cruise went from inactive to active this cycle.
    pub fn just_engaged(&self) -> bool {
        self.enabled && !self.enabled_previous
    }

    /// Cruise has been engaged at least once.
    pub fn resume_available(&self) -> bool {
        self.resume_available
    }

    pub fn acc_type(&self) -> i64 {
        self.acc_type
    }

    pub fn low_speed_lockout(&self) -> bool {
        self.low_speed_lockout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selfdrive::car::toyota::values::Car;
    use approx::assert_abs_diff_eq;

    fn readings(cruise_state: i64) -> CruiseReadings {
        CruiseReadings {
            main_on: true,
            cruise_state,
            ..Default::default()
        }
    }

    #[test]
    fn test_standstill_code() {
        let mut tracker = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
        assert!(tracker.update(&readings(7), false).standstill);
        assert!(!tracker.update(&readings(8), false).standstill);
    }

    #[test]
    fn test_standstill_suppressed() {
        let mut hybrid = CruiseStateTracker::new(Car::Rav4h.info(), false, 1.0);
        assert!(!hybrid.update(&readings(7), false).standstill);

        let mut interceptor = CruiseStateTracker::new(Car::Corolla.info(), true, 1.0);
        assert!(!interceptor.update(&readings(7), false).standstill);
    }

    #[test]
    fn test_non_adaptive_codes() {
        let mut tracker = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
        for code in 0..12 {
            let cruise = tracker.update(&readings(code), false);
            assert_eq!(cruise.non_adaptive, (1..=6).contains(&code), "code {code}");
        }
    }

    #[test]
    fn test_set_speed_scaling() {
        let set = CruiseReadings {
            set_speed: 100.0,
            ..readings(8)
        };

        let mut pcm = CruiseStateTracker::new(Car::Corolla.info(), false, 1.1);
        assert_abs_diff_eq!(pcm.update(&set, false).speed, 110.0 / 3.6, epsilon = 1e-9);

        let mut dsu = CruiseStateTracker::new(Car::LexusIs.info(), false, 1.1);
        assert_abs_diff_eq!(dsu.update(&set, false).speed, 100.0 / 3.6, epsilon = 1e-9);
    }

    #[test]
    fn test_first_cycle_has_no_button_edge() {
        let mut tracker = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
        tracker.update(&readings(9), false);
        assert_eq!(tracker.prev_buttons(), 9);
        assert_eq!(tracker.buttons(), 9);
        assert!(!tracker.cancel_edge());
    }

    #[test]
    fn test_cancel_edge() {
        let mut tracker = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
        tracker.update(&readings(8), false);
        tracker.update(&readings(0), false);
        assert!(tracker.cancel_edge());
        tracker.update(&readings(0), false);
        assert!(!tracker.cancel_edge());
    }

    #[test]
    fn test_engagement_edge_and_resume() {
        let mut tracker = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
        let active = CruiseReadings {
            cruise_active: true,
            ..readings(8)
        };

        tracker.update(&readings(0), false);
        assert!(!tracker.just_engaged());
        assert!(!tracker.resume_available());

        assert!(tracker.update(&active, false).enabled);
        assert!(tracker.just_engaged());
        assert!(tracker.resume_available());

        tracker.update(&active, false);
        assert!(!tracker.just_engaged());

        tracker.update(&readings(0), false);
        assert!(tracker.resume_available());
    }

    #[test]
    fn test_low_speed_lockout() {
        let locked = CruiseReadings {
            low_speed_lockout: 2,
            acc_type: 2,
            ..readings(0)
        };

        let mut tss1 = CruiseStateTracker::new(Car::Corolla.info(), false, 1.0);
        tss1.update(&locked, false);
        assert!(tss1.low_speed_lockout());

        // ACC type 2 marks a permanent lockout on TSS2; ignored.
        let mut tss2 = CruiseStateTracker::new(Car::CorollaTss2.info(), false, 1.0);
        tss2.update(&locked, false);
        assert_eq!(tss2.acc_type(), 2);
        assert!(!tss2.low_speed_lockout());

        tss2.update(&locked, true);
        assert_eq!(tss2.acc_type(), 1);
        assert!(tss2.low_speed_lockout());

        let mut dsu = CruiseStateTracker::new(Car::LexusRc.info(), false, 1.0);
        dsu.update(&locked, false);
        assert!(!dsu.low_speed_lockout());
    }
}
