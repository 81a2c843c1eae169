//! Discrete button events derived from cycle-to-cycle state changes.

use crate::selfdrive::car::structs::{ButtonEvent, ButtonType};
use crate::selfdrive::car::toyota::values::CruiseButtons;

/// State deltas the button events are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonInputs {
    /// Cruise engaged as published last cycle.
    pub prev_cruise_enabled: bool,
    pub cruise_enabled: bool,
    pub prev_cruise_buttons: i64,
    pub cruise_buttons: i64,
    /// Lane keeping flag as published last cycle.
    pub prev_lkas_enabled: bool,
    pub lkas_enabled: bool,
}

/// Maps a raw cruise button code to its button type.
pub fn cruise_button_type(code: i64) -> ButtonType {
    match code {
        CruiseButtons::ACCEL_ACC | CruiseButtons::ACCEL_CC => ButtonType::AccelCruise,
        CruiseButtons::DECEL_ACC | CruiseButtons::DECEL_CC => ButtonType::DecelCruise,
        _ => ButtonType::Unknown,
    }
}

/// Builds this cycle's button events, at most one per kind, in a fixed order.
///
/// # Examples
///
/// ```rust
/// use carstate::selfdrive::car::structs::{ButtonEvent, ButtonType};
/// use carstate::selfdrive::car::toyota::buttons::{synthesize_button_events, ButtonInputs};
///
/// let press = ButtonInputs { prev_cruise_buttons: 0, cruise_buttons: 9, ..Default::default() };
/// assert_eq!(
///     synthesize_button_events(&press),
///     vec![ButtonEvent::new(ButtonType::AccelCruise, true)]
/// );
/// ```
pub fn synthesize_button_events(inputs: &ButtonInputs) -> Vec<ButtonEvent> {
    let mut events = Vec::new();

    if inputs.cruise_enabled && !inputs.prev_cruise_enabled {
        events.push(ButtonEvent::new(ButtonType::SetCruise, false));
    } else if inputs.prev_cruise_enabled && !inputs.cruise_enabled {
        events.push(ButtonEvent::new(ButtonType::Cancel, true));
    }

    if inputs.cruise_buttons != inputs.prev_cruise_buttons {
        let current = cruise_button_type(inputs.cruise_buttons);
        let event = if current != ButtonType::Unknown {
            ButtonEvent::new(current, true)
        } else {
            ButtonEvent::new(cruise_button_type(inputs.prev_cruise_buttons), false)
        };
        events.push(event);
    }

    if inputs.lkas_enabled != inputs.prev_lkas_enabled {
        events.push(ButtonEvent::new(ButtonType::AltButton1, true));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buttons(prev: i64, current: i64) -> ButtonInputs {
        ButtonInputs {
            prev_cruise_buttons: prev,
            cruise_buttons: current,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_change_no_events() {
        assert!(synthesize_button_events(&buttons(9, 9)).is_empty());
        assert!(synthesize_button_events(&ButtonInputs::default()).is_empty());
    }

    #[test]
    fn test_accel_press_then_release() {
        assert_eq!(
            synthesize_button_events(&buttons(0, 1)),
            vec![ButtonEvent::new(ButtonType::AccelCruise, true)]
        );
        assert_eq!(
            synthesize_button_events(&buttons(1, 0)),
            vec![ButtonEvent::new(ButtonType::AccelCruise, false)]
        );
    }

    #[test]
    fn test_decel_codes() {
        for code in [CruiseButtons::DECEL_CC, CruiseButtons::DECEL_ACC] {
            assert_eq!(
                synthesize_button_events(&buttons(0, code)),
                vec![ButtonEvent::new(ButtonType::DecelCruise, true)]
            );
        }
    }

    #[test]
    fn test_unlisted_codes_are_unknown() {
        // Standstill code after a plain cruise code: released, type unknown.
        assert_eq!(
            synthesize_button_events(&buttons(8, 7)),
            vec![ButtonEvent::new(ButtonType::Unknown, false)]
        );
    }

    #[test]
    fn test_accel_to_decel_is_a_press() {
        assert_eq!(
            synthesize_button_events(&buttons(9, 10)),
            vec![ButtonEvent::new(ButtonType::DecelCruise, true)]
        );
    }

    #[test]
    fn test_engagement_edges() {
        let engaged = ButtonInputs {
            cruise_enabled: true,
            ..Default::default()
        };
        assert_eq!(
            synthesize_button_events(&engaged),
            vec![ButtonEvent::new(ButtonType::SetCruise, false)]
        );

        let dropped = ButtonInputs {
            prev_cruise_enabled: true,
            ..Default::default()
        };
        assert_eq!(
            synthesize_button_events(&dropped),
            vec![ButtonEvent::new(ButtonType::Cancel, true)]
        );
    }

    #[test]
    fn test_lane_keep_toggle_both_directions() {
        for (prev, current) in [(false, true), (true, false)] {
            let inputs = ButtonInputs {
                prev_lkas_enabled: prev,
                lkas_enabled: current,
                ..Default::default()
            };
            assert_eq!(
                synthesize_button_events(&inputs),
                vec![ButtonEvent::new(ButtonType::AltButton1, true)]
            );
        }
    }

    #[test]
    fn test_event_order() {
        let inputs = ButtonInputs {
            prev_cruise_enabled: false,
            cruise_enabled: true,
            prev_cruise_buttons: 0,
            cruise_buttons: 9,
            prev_lkas_enabled: false,
            lkas_enabled: true,
        };
        assert_eq!(
            synthesize_button_events(&inputs),
            vec![
                ButtonEvent::new(ButtonType::SetCruise, false),
                ButtonEvent::new(ButtonType::AccelCruise, true),
                ButtonEvent::new(ButtonType::AltButton1, true),
            ]
        );
    }
}
