use ndarray::{arr2, Array2};

/// Represents a steady-state Kalman filter over a two-element state (value and its rate).
///
/// The gain `K` is precomputed, so an update is a single matrix step:
/// `x = (A - K C) x + K z`.
///
/// # Examples
///
/// ```rust
/// use carstate::common::kalman::KF1D;
/// use ndarray::arr2;
///
/// let mut kf = KF1D::new(
///     arr2(&[[0.0], [0.0]]),
///     arr2(&[[1.0, 0.01], [0.0, 1.0]]),
///     arr2(&[[1.0, 0.0]]),
///     arr2(&[[0.12287673], [0.29666309]]),
/// );
///
/// let (value, rate) = kf.update(1.0);
/// assert!(value > 0.0 && rate > 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct KF1D {
    /// State column vector (2x1).
    pub x: Array2<f64>,
    /// Precomputed `A - K C` (2x2).
    a_k: Array2<f64>,
    /// Steady-state gain (2x1).
    k: Array2<f64>,
}

impl KF1D {
    /// Creates a new `KF1D` instance.
    ///
    /// # Arguments
    ///
    /// * `x0` - Initial state column (2x1).
    /// * `a` - State transition matrix (2x2).
    /// * `c` - Observation matrix (1x2).
    /// * `k` - Steady-state Kalman gain (2x1).
    pub fn new(x0: Array2<f64>, a: Array2<f64>, c: Array2<f64>, k: Array2<f64>) -> Self {
        assert!(
            x0.shape() == [2, 1] && a.shape() == [2, 2] && c.shape() == [1, 2] && k.shape() == [2, 1],
            "KF1D expects a 2x1 state, 2x2 transition, 1x2 observation and 2x1 gain"
        );
        let a_k = &a - &k.dot(&c);
        KF1D { x: x0, a_k, k }
    }

    /// Feeds one scalar measurement and returns the updated `(value, rate)`.
    pub fn update(&mut self, meas: f64) -> (f64, f64) {
        self.x = self.a_k.dot(&self.x) + &self.k * meas;
        self.state()
    }

    /// Current `(value, rate)` estimate.
    pub fn state(&self) -> (f64, f64) {
        (self.x[[0, 0]], self.x[[1, 0]])
    }

    /// Snaps the estimate to `value` with zero rate.
    pub fn reset(&mut self, value: f64) {
        self.x = arr2(&[[value], [0.0]]);
    }
}
