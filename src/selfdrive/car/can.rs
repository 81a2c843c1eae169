//! Read-only view of decoded bus signals for one control cycle.
//!
//! Decoding belongs to the bus collaborator; this module only describes what car state estimation
//! reads from it.

use crate::error::CarError;
use std::collections::{HashMap, HashSet};

/// Decoded signal values plus per-message freshness.
pub trait SignalSource {
    /// Latest decoded value of `signal` in `message`, if the message was ever received.
    fn signal(&self, message: &str, signal: &str) -> Option<f64>;

    /// Whether `message` arrived within its expected period.
    fn is_fresh(&self, message: &str) -> bool;

    /// Signal value or `default` when it has never been received.
    fn value_or(&self, message: &str, signal: &str, default: f64) -> f64 {
        self.signal(message, signal).unwrap_or(default)
    }

    /// Signal value, zero when it has never been received.
    fn value(&self, message: &str, signal: &str) -> f64 {
        self.value_or(message, signal, 0.0)
    }
}

/// Checks that every message in `checks` is fresh.
///
/// # Examples
///
/// ```rust
/// use carstate::selfdrive::car::can::{check_freshness, SignalSnapshot};
///
/// let mut bus = SignalSnapshot::new();
/// assert!(check_freshness(&bus, &["WHEEL_SPEEDS"]).is_ok());
///
/// bus.mark_stale("WHEEL_SPEEDS");
/// assert!(check_freshness(&bus, &["WHEEL_SPEEDS"]).is_err());
/// ```
pub fn check_freshness<S: SignalSource + ?Sized>(source: &S, checks: &[&str]) -> Result<(), CarError> {
    let stale: Vec<String> = checks
        .iter()
        .filter(|message| !source.is_fresh(message))
        .map(|message| message.to_string())
        .collect();

    if stale.is_empty() {
        Ok(())
    } else {
        Err(CarError::StaleBus(stale))
    }
}

/// In-memory signal snapshot.
///
/// Messages are fresh unless explicitly marked stale.
///
/// # Examples
///
/// ```rust
/// use carstate::selfdrive::car::can::{SignalSnapshot, SignalSource};
///
/// let mut bus = SignalSnapshot::new();
/// bus.set("STEERING_LEVERS", "TURN_SIGNALS", 1.0);
///
/// assert_eq!(bus.value("STEERING_LEVERS", "TURN_SIGNALS"), 1.0);
/// assert_eq!(bus.value_or("SEATS_DOORS", "DOOR_OPEN_FL", 1.0), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignalSnapshot {
    values: HashMap<String, HashMap<String, f64>>,
    stale: HashSet<String>,
}

impl SignalSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a signal value.
    pub fn set(&mut self, message: &str, signal: &str, value: f64) -> &mut Self {
        self.values
            .entry(message.to_string())
            .or_default()
            .insert(signal.to_string(), value);
        self
    }

    /// Builder form of [`SignalSnapshot::set`].
    pub fn with(mut self, message: &str, signal: &str, value: f64) -> Self {
        self.set(message, signal, value);
        self
    }

    /// Marks a message as missed its deadline.
    pub fn mark_stale(&mut self, message: &str) -> &mut Self {
        self.stale.insert(message.to_string());
        self
    }

    /// Clears a stale mark.
    pub fn mark_fresh(&mut self, message: &str) -> &mut Self {
        self.stale.remove(message);
        self
    }
}

impl SignalSource for SignalSnapshot {
    fn signal(&self, message: &str, signal: &str) -> Option<f64> {
        self.values.get(message)?.get(signal).copied()
    }

    fn is_fresh(&self, message: &str) -> bool {
        !self.stale.contains(message)
    }
}
