//! # carstate
//!
//! `carstate` is the per-cycle vehicle state estimation and engagement arbitration core of an
//! openpilot car port. Every control cycle (100 Hz) it turns a snapshot of decoded bus signals into
//! a normalized [`VehicleState`](selfdrive/car/structs/struct.VehicleState.html), synthesizes the
//! driver's button events from state deltas, and emits the engagement events consumed by the
//! control loop.
//!
//! ## Modules
//!
//! - [SteeringAngleEstimator](selfdrive/car/toyota/steering/struct.SteeringAngleEstimator.html):
//!   fuses the stock steering angle sensor, the torque-sensor angle and an optional auxiliary (ZSS)
//!   sensor with sticky calibration offsets and a tolerance fallback.
//!
//! - [CruiseStateTracker](selfdrive/car/toyota/cruise/struct.CruiseStateTracker.html): cruise
//!   availability, engagement, standstill and raw button-code history.
//!
//! - [LaneKeepArbiter](selfdrive/car/toyota/lane_keep/struct.LaneKeepArbiter.html): lane-keep
//!   enable state machine and steer-warning gating.
//!
//! - [BrakeHoldGovernor](selfdrive/car/toyota/brake_hold/struct.BrakeHoldGovernor.html):
//!   automatic brake hold timer with an edge-triggered reset latch.
//!
//! - [CarState](selfdrive/car/toyota/carstate/struct.CarState.html): runs the estimators above and
//!   assembles the per-cycle state.
//!
//! - [CarInterface](selfdrive/car/toyota/interface/struct.CarInterface.html): button events,
//!   engagement arbitration and the published state.
//!
//! ## Usage
//!
//! To use the `carstate` crate in your project, add the following line to your `Cargo.toml` file:
//!
//! ```toml
//! [dependencies]
//! carstate = "0.1.0"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use carstate::common::params::{MemoryParams, Settings};
//! use carstate::selfdrive::car::can::SignalSnapshot;
//! use carstate::selfdrive::car::toyota::interface::CarInterface;
//! use carstate::selfdrive::car::toyota::tunes::Tunes;
//! use carstate::selfdrive::car::toyota::values::{Car, CarParams};
//!
//! let mut car = CarInterface::new(CarParams::new(Car::Corolla), Tunes::default());
//!
//! let mut pt = SignalSnapshot::new();
//! pt.set("STEER_ANGLE_SENSOR", "STEER_ANGLE", 10.0);
//! let cam = SignalSnapshot::new();
//! let settings = Settings::sample(&MemoryParams::new());
//!
//! // Run one control cycle
//! let state = car.update(&pt, &cam, &settings);
//! assert_eq!(state.steering_angle_deg, 10.0);
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT License](LICENSE).

pub mod common;
pub mod error;
pub mod selfdrive;
