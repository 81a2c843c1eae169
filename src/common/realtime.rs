//! Control loop timing.

/// Period of the control loop in seconds (100 Hz).
pub const DT_CTRL: f64 = 0.01;

/// Returns the number of control cycles covering `seconds`, never less than one.
///
/// # Examples
///
/// ```rust
/// use carstate::common::realtime::cycles_per;
///
/// assert_eq!(cycles_per(1.0), 100);
/// assert_eq!(cycles_per(0.0), 1);
/// ```
pub fn cycles_per(seconds: f64) -> u64 {
    let cycles = (seconds / DT_CTRL).round();
    if cycles.is_finite() && cycles >= 1.0 {
        cycles as u64
    } else {
        1
    }
}
