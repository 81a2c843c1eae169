//! Automatic brake hold.
//!
//! After the car has been stopped with cruise off for a few seconds the governor asks the control
//! loop to hold the brakes. Pressing the brake pedal again releases the hold until the car moves
//! or the conditions otherwise lapse.

use crate::selfdrive::car::structs::GearShifter;
use log::debug;

/// Inputs of the brake hold condition for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrakeHoldInputs {
    /// Raw wheel speed is zero.
    pub standstill: bool,
    pub cruise_available: bool,
    pub cruise_enabled: bool,
    pub gas_pressed: bool,
    pub brake_pressed: bool,
    pub gear: GearShifter,
    /// Automatic brake hold feature switch.
    pub feature_enabled: bool,
}

impl BrakeHoldInputs {
    /// Whether every condition for holding the brakes is met.
    pub fn condition_satisfied(&self) -> bool {
        self.standstill
            && self.cruise_available
            && !self.gas_pressed
            && !self.cruise_enabled
            && !matches!(self.gear, GearShifter::Reverse | GearShifter::Park)
            && self.feature_enabled
    }
}

/// Persistent state of the governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrakeHoldState {
    pub condition_satisfied: bool,
    /// Consecutive cycles with the condition satisfied.
    pub counter: u32,
    pub governor_active: bool,
    /// A brake press released the hold for the rest of the satisfied span.
    pub reset_latched: bool,
}

/// Timer-based automatic brake hold.
#[derive(Debug, Clone)]
pub struct BrakeHoldGovernor {
    threshold: u32,
    state: BrakeHoldState,
    prev_brake_pressed: bool,
}

impl BrakeHoldGovernor {
    /// Creates a new `BrakeHoldGovernor`.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Satisfied cycles that must elapse before the hold engages.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            state: BrakeHoldState::default(),
            // No brake edge on the first cycle.
            prev_brake_pressed: true,
        }
    }

    /// Runs one cycle and returns whether the governor is active.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::structs::GearShifter;
    /// use carstate::selfdrive::car::toyota::brake_hold::{BrakeHoldGovernor, BrakeHoldInputs};
    ///
    /// let mut governor = BrakeHoldGovernor::new(2);
    /// let stopped = BrakeHoldInputs {
    ///     standstill: true,
    ///     cruise_available: true,
    ///     gear: GearShifter::Drive,
    ///     feature_enabled: true,
    ///     ..Default::default()
    /// };
    ///
    /// assert!(!governor.update(&stopped));
    /// assert!(!governor.update(&stopped));
    /// assert!(governor.update(&stopped));
    /// ```
    pub fn update(&mut self, inputs: &BrakeHoldInputs) -> bool {
        let satisfied = inputs.condition_satisfied();
        let was_active = self.state.governor_active;

        if satisfied {
            self.state.counter = self.state.counter.saturating_add(1);
            if inputs.brake_pressed && !self.prev_brake_pressed {
                self.state.reset_latched = true;
            }
            self.state.governor_active =
                self.state.counter > self.threshold && !self.state.reset_latched;
        } else {
            self.state.counter = 0;
            self.state.reset_latched = false;
            self.state.governor_active = false;
        }
        self.state.condition_satisfied = satisfied;
        self.prev_brake_pressed = inputs.brake_pressed;

        if self.state.governor_active != was_active {
            debug!(
                "automatic brake hold {} after {} cycles",
                if self.state.governor_active { "engaged" } else { "released" },
                self.state.counter
            );
        }
        self.state.governor_active
    }

    pub fn active(&self) -> bool {
        self.state.governor_active
    }

    pub fn state(&self) -> BrakeHoldState {
        self.state
    }
}
