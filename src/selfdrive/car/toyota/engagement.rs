//! Engagement requests and alerts derived from the button events.

use crate::selfdrive::car::structs::{ButtonType, EventName, VehicleState};

/// Turns button events into enable requests, cancellations and alerts.
///
/// Keeps a sticky "disengaged by brake" flag: after the control loop drops out on a brake press,
/// lane keeping re-engages silently once the pedal is released.
#[derive(Debug, Clone, Default)]
pub struct EngagementArbiter {
    disengaged_by_brake: bool,
}

impl EngagementArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the control loop disengaged because of a brake press.
    pub fn notify_disengaged_by_brake(&mut self) {
        self.disengaged_by_brake = true;
    }

    pub fn disengaged_by_brake(&self) -> bool {
        self.disengaged_by_brake
    }

    /// Appends this cycle's engagement events to `events`.
    ///
    /// # Arguments
    ///
    /// * `cs` - Vehicle state of this cycle, button events included.
    /// * `events` - Event list, usually already holding the common alerts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carstate::selfdrive::car::structs::{ButtonEvent, ButtonType, EventName, VehicleState};
    /// use carstate::selfdrive::car::toyota::engagement::EngagementArbiter;
    ///
    /// let mut arbiter = EngagementArbiter::new();
    /// let mut cs = VehicleState::default();
    /// cs.cruise_state.enabled = true;
    /// cs.button_events = vec![ButtonEvent::new(ButtonType::SetCruise, false)];
    ///
    /// let mut events = Vec::new();
    /// arbiter.update(&cs, &mut events);
    /// assert_eq!(events, vec![EventName::ButtonEnable]);
    /// ```
    pub fn update(&mut self, cs: &VehicleState, events: &mut Vec<EventName>) {
        let pedal_released = !cs.brake_pressed && !cs.brake_hold_active;

        let enable_from_brake = self.disengaged_by_brake && pedal_released && cs.lkas_enabled;
        let mut enable_pressed = enable_from_brake;

        if pedal_released {
            self.disengaged_by_brake = false;
        }

        for button in &cs.button_events {
            match (button.button_type, button.pressed) {
                (ButtonType::SetCruise, false) => enable_pressed = true,
                (ButtonType::AltButton1, true) => {
                    if cs.lkas_enabled {
                        if !cs.cruise_state.enabled {
                            enable_pressed = true;
                        }
                    } else if cs.cruise_state.enabled {
                        events.push(EventName::ManualSteeringRequired);
                    } else {
                        events.push(EventName::ButtonCancel);
                    }
                }
                (ButtonType::Cancel, true) => {
                    events.push(if cs.lkas_enabled {
                        EventName::ManualLongitudinalRequired
                    } else {
                        EventName::ButtonCancel
                    });
                }
                _ => {}
            }
        }

        if enable_pressed && (cs.cruise_state.enabled || cs.lkas_enabled) {
            events.push(if enable_from_brake {
                EventName::SilentButtonEnable
            } else {
                EventName::ButtonEnable
            });
        }

        if cs.brakehold_governor {
            events.push(EventName::AutomaticBrakehold);
        }
    }
}
