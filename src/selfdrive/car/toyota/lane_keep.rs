//! Lane keeping enable state machine.
//!
//! With independent lane keeping ("MADS") the camera's lane keeping button toggles lateral
//! control on its own. Without it lane keeping follows cruise control.

use crate::selfdrive::car::toyota::values::{
    LkasEncoding, EPS_NOMINAL_STATES, EPS_NOT_ALLOWED_STATES, LTA_LKAS_OFF, LTA_LKAS_ON,
};

/// Inputs deciding whether lane keeping is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaneKeepInputs {
    pub cruise_available: bool,
    /// Raw lane keeping button value in the car's encoding.
    pub lkas_button: i64,
    pub brake_pressed: bool,
    /// Cruise button code went from nonzero to zero this cycle.
    pub cancel_edge: bool,
    pub cruise_enabled: bool,
    /// Lane keeping engages independently of cruise.
    pub mads_enabled: bool,
    /// A rising edge of cruise engagement enables lane keeping.
    pub acc_mads_combo: bool,
}

/// Inputs of the steer warning.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteerStatus {
    /// `EPS_STATUS.LKA_STATE`.
    pub eps_state: i64,
    pub v_ego: f64,
    pub left_blinker: bool,
    pub right_blinker: bool,
    pub automatic_lane_change: bool,
}

/// Lane keeping decision for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaneKeepOutput {
    pub enabled: bool,
    pub steer_warning: bool,
    /// The EPS refuses steering commands.
    pub steer_not_allowed: bool,
}

/// Hysteresis state machine for lane keeping.
#[derive(Debug, Clone)]
pub struct LaneKeepArbiter {
    encoding: LkasEncoding,
    lane_change_min_speed: f64,
    enabled: bool,
    prev_button: Option<i64>,
    prev_cruise_enabled: Option<bool>,
}

impl LaneKeepArbiter {
    /// Creates a new `LaneKeepArbiter` with lane keeping disabled.
    ///
    /// # Arguments
    ///
    /// * `encoding` - How the camera reports the lane keeping button.
    /// * `lane_change_min_speed` - Minimum speed for an automatic lane change (m/s).
    pub fn new(encoding: LkasEncoding, lane_change_min_speed: f64) -> Self {
        Self {
            encoding,
            lane_change_min_speed,
            enabled: false,
            prev_button: None,
            prev_cruise_enabled: None,
        }
    }

    /// Whether lane keeping is currently enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Runs one cycle of the state machine and the steer warning.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::toyota::lane_keep::{LaneKeepArbiter, LaneKeepInputs, SteerStatus};
    /// use carstate::selfdrive::car::toyota::values::LkasEncoding;
    ///
    /// let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, 13.4);
    /// let inputs = LaneKeepInputs { cruise_available: true, cruise_enabled: true, ..Default::default() };
    /// let status = SteerStatus { eps_state: 5, ..Default::default() };
    ///
    /// let output = arbiter.update(&inputs, &status);
    /// assert!(output.enabled);
    /// assert!(!output.steer_warning);
    /// ```
    pub fn update(&mut self, inputs: &LaneKeepInputs, status: &SteerStatus) -> LaneKeepOutput {
        let prev_button = self
            .prev_button
            .replace(inputs.lkas_button)
            .unwrap_or(inputs.lkas_button);
        let prev_cruise_enabled = self
            .prev_cruise_enabled
            .replace(inputs.cruise_enabled)
            .unwrap_or(inputs.cruise_enabled);

        if !inputs.cruise_available {
            self.enabled = false;
        } else if inputs.mads_enabled {
            if let Some(enabled) = self.button_transition(prev_button, inputs.lkas_button) {
                self.enabled = enabled;
            }
            // One-directional: disengaging cruise never disables lane keeping.
            if inputs.acc_mads_combo && inputs.cruise_enabled && !prev_cruise_enabled {
                self.enabled = true;
            }
        } else {
            if inputs.cancel_edge || inputs.brake_pressed {
                self.enabled = false;
            }
            if inputs.cruise_enabled {
                self.enabled = true;
            }
        }

        let mut output = LaneKeepOutput {
            enabled: self.enabled,
            ..Default::default()
        };
        if self.enabled {
            output.steer_not_allowed = EPS_NOT_ALLOWED_STATES.contains(&status.eps_state);
            output.steer_warning = !self.lane_change_in_progress(status)
                && !EPS_NOMINAL_STATES.contains(&status.eps_state);
        }
        output
    }

    /// `Some(true)` on a press, `Some(false)` on a release into the explicit off state.
    fn button_transition(&self, prev: i64, current: i64) -> Option<bool> {
        match self.encoding {
            LkasEncoding::LtaMessage => {
                if prev != LTA_LKAS_ON && current == LTA_LKAS_ON {
                    Some(true)
                } else if prev != LTA_LKAS_OFF && current == LTA_LKAS_OFF {
                    Some(false)
                } else {
                    None
                }
            }
            LkasEncoding::LegacyBit => {
                if prev == 0 && current != 0 {
                    Some(true)
                } else if prev == 1 && current == 0 {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    fn lane_change_in_progress(&self, status: &SteerStatus) -> bool {
        status.automatic_lane_change
            && status.v_ego >= self.lane_change_min_speed
            && (status.left_blinker || status.right_blinker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANE_CHANGE_SPEED: f64 = 13.4112;

    fn mads(lkas_button: i64) -> LaneKeepInputs {
        LaneKeepInputs {
            cruise_available: true,
            lkas_button,
            mads_enabled: true,
            ..Default::default()
        }
    }

    fn nominal() -> SteerStatus {
        SteerStatus {
            eps_state: 5,
            v_ego: 20.0,
            automatic_lane_change: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_unavailable_forces_disabled() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        arbiter.update(&mads(0), &nominal());
        assert!(arbiter.update(&mads(1), &nominal()).enabled);

        let unavailable = LaneKeepInputs {
            cruise_available: false,
            ..mads(1)
        };
        assert!(!arbiter.update(&unavailable, &nominal()).enabled);
    }

    #[test]
    fn test_legacy_button_edges() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);

        // Held at power-on: no edge on the first cycle.
        assert!(!arbiter.update(&mads(1), &nominal()).enabled);
        assert!(!arbiter.update(&mads(0), &nominal()).enabled);
        assert!(arbiter.update(&mads(1), &nominal()).enabled);
        assert!(arbiter.update(&mads(1), &nominal()).enabled);
        assert!(!arbiter.update(&mads(0), &nominal()).enabled);
    }

    #[test]
    fn test_lta_button_codes() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LtaMessage, LANE_CHANGE_SPEED);
        arbiter.update(&mads(0), &nominal());

        assert!(arbiter.update(&mads(LTA_LKAS_ON), &nominal()).enabled);
        // Codes other than the explicit off code are ignored.
        assert!(arbiter.update(&mads(0), &nominal()).enabled);
        assert!(arbiter.update(&mads(3), &nominal()).enabled);
        assert!(!arbiter.update(&mads(LTA_LKAS_OFF), &nominal()).enabled);
        assert!(!arbiter.update(&mads(LTA_LKAS_OFF), &nominal()).enabled);
        assert!(arbiter.update(&mads(LTA_LKAS_ON), &nominal()).enabled);
    }

    #[test]
    fn test_combo_enables_on_cruise_rising_edge_only() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        let combo = |cruise_enabled| LaneKeepInputs {
            cruise_enabled,
            acc_mads_combo: true,
            ..mads(0)
        };

        assert!(!arbiter.update(&combo(false), &nominal()).enabled);
        assert!(arbiter.update(&combo(true), &nominal()).enabled);
        // Cruise drops: lane keeping stays.
        assert!(arbiter.update(&combo(false), &nominal()).enabled);
    }

    #[test]
    fn test_combo_no_edge_on_first_cycle() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        let engaged = LaneKeepInputs {
            cruise_enabled: true,
            acc_mads_combo: true,
            ..mads(0)
        };
        assert!(!arbiter.update(&engaged, &nominal()).enabled);
    }

    #[test]
    fn test_combo_wins_over_same_cycle_cancel() {
        // Independent mode ignores the cancel edge; the combo enable stands.
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        let idle = LaneKeepInputs {
            acc_mads_combo: true,
            ..mads(0)
        };
        arbiter.update(&idle, &nominal());

        let engaged_and_cancelled = LaneKeepInputs {
            cruise_enabled: true,
            cancel_edge: true,
            ..idle
        };
        assert!(arbiter.update(&engaged_and_cancelled, &nominal()).enabled);
    }

    #[test]
    fn test_mads_ignores_brake() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        arbiter.update(&mads(0), &nominal());
        arbiter.update(&mads(1), &nominal());

        let braking = LaneKeepInputs {
            brake_pressed: true,
            ..mads(1)
        };
        assert!(arbiter.update(&braking, &nominal()).enabled);
    }

    #[test]
    fn test_legacy_follows_cruise() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        let legacy = |cruise_enabled, brake_pressed, cancel_edge| LaneKeepInputs {
            cruise_available: true,
            cruise_enabled,
            brake_pressed,
            cancel_edge,
            ..Default::default()
        };

        assert!(!arbiter.update(&legacy(false, false, false), &nominal()).enabled);
        assert!(arbiter.update(&legacy(true, false, false), &nominal()).enabled);
        // Cruise dropped without brake or cancel: latched.
        assert!(arbiter.update(&legacy(false, false, false), &nominal()).enabled);
        assert!(!arbiter.update(&legacy(false, true, false), &nominal()).enabled);

        arbiter.update(&legacy(true, false, false), &nominal());
        assert!(!arbiter.update(&legacy(false, false, true), &nominal()).enabled);

        // Cruise enabled overrides brake in the same cycle.
        assert!(arbiter.update(&legacy(true, true, false), &nominal()).enabled);
    }

    #[test]
    fn test_steer_warning_only_while_enabled() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        let faulted = SteerStatus {
            eps_state: 25,
            ..nominal()
        };

        let output = arbiter.update(&mads(0), &faulted);
        assert!(!output.steer_warning);
        assert!(!output.steer_not_allowed);

        let output = arbiter.update(&mads(1), &faulted);
        assert!(output.steer_warning);
        assert!(output.steer_not_allowed);
    }

    #[test]
    fn test_steer_warning_nominal_states() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        arbiter.update(&mads(0), &nominal());
        for eps_state in [1, 2, 5, 9, 10] {
            let status = SteerStatus {
                eps_state,
                ..nominal()
            };
            let output = arbiter.update(&mads(1), &status);
            assert_eq!(output.steer_warning, eps_state != 1 && eps_state != 5, "state {eps_state}");
        }
    }

    #[test]
    fn test_lane_change_suppresses_warning() {
        let mut arbiter = LaneKeepArbiter::new(LkasEncoding::LegacyBit, LANE_CHANGE_SPEED);
        arbiter.update(&mads(0), &nominal());
        let blinking = SteerStatus {
            eps_state: 10,
            left_blinker: true,
            ..nominal()
        };

        assert!(!arbiter.update(&mads(1), &blinking).steer_warning);

        // Too slow for a lane change: the blinker alone does not suppress.
        let slow = SteerStatus {
            v_ego: 10.0,
            ..blinking
        };
        assert!(arbiter.update(&mads(1), &slow).steer_warning);

        // Automatic lane change off.
        let manual = SteerStatus {
            automatic_lane_change: false,
            ..blinking
        };
        assert!(arbiter.update(&mads(1), &manual).steer_warning);
    }
}
