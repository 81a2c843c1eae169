//! Bus snapshots for tests.

use crate::selfdrive::car::can::SignalSnapshot;

/// Powertrain bus of a parked-in-drive car with the cruise main switch on and nothing pressed.
pub(crate) fn healthy_pt() -> SignalSnapshot {
    SignalSnapshot::new()
        .with("SEATS_DOORS", "DOOR_OPEN_FL", 0.0)
        .with("SEATS_DOORS", "DOOR_OPEN_FR", 0.0)
        .with("SEATS_DOORS", "DOOR_OPEN_RL", 0.0)
        .with("SEATS_DOORS", "DOOR_OPEN_RR", 0.0)
        .with("SEATS_DOORS", "SEATBELT_DRIVER_UNLATCHED", 0.0)
        .with("ESP_CONTROL", "TC_DISABLED", 0.0)
        .with("ESP_CONTROL", "BRAKE_HOLD_ACTIVE", 0.0)
        .with("ESP_CONTROL", "BRAKE_LIGHTS_ACC", 0.0)
        .with("PCM_CRUISE", "GAS_RELEASED", 1.0)
        .with("STEERING_LEVERS", "TURN_SIGNALS", 3.0)
        .with("GEAR_PACKET", "GEAR", 0.0)
        .with("PCM_CRUISE_2", "MAIN_ON", 1.0)
        .with("EPS_STATUS", "LKA_STATE", 5.0)
}

/// Camera bus with no lane keeping button pressed.
pub(crate) fn healthy_cam() -> SignalSnapshot {
    SignalSnapshot::new()
        .with("LKAS_HUD", "SET_ME_X01", 0.0)
        .with("LKAS_HUD", "LDA_ON_MESSAGE", 0.0)
}

/// Sets all four wheel speeds, in km/h.
pub(crate) fn with_speed(snapshot: SignalSnapshot, kph: f64) -> SignalSnapshot {
    snapshot
        .with("WHEEL_SPEEDS", "WHEEL_SPEED_FL", kph)
        .with("WHEEL_SPEEDS", "WHEEL_SPEED_FR", kph)
        .with("WHEEL_SPEEDS", "WHEEL_SPEED_RL", kph)
        .with("WHEEL_SPEEDS", "WHEEL_SPEED_RR", kph)
}
