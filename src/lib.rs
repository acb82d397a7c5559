//! # Sun Tracker
//!
//! Closed-loop positioning for a two-axis solar tracker.
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`axis`] | Axes, motor directions and motor commands |
//! | [`config`] | Tuning constants and per-axis profiles |
//! | [`ports`] | Sensor, actuator and telemetry seams the controller drives |
//! | [`controller`] | The per-axis positioning loop |
//! | [`sun`] | Sun position from date, time and site |
//! | [`heading`] | Angles derived from raw accelerometer/magnetometer vectors |
//! | [`tracker`] | One tracking interval: sun position to both axes |
//!
//! The `esp` feature adds the ESP32 drivers in `hw` and the firmware binary.

pub mod axis;
pub mod config;
pub mod controller;
pub mod heading;
pub mod ports;
pub mod sun;
pub mod tracker;

#[cfg(feature = "esp")]
pub mod error;
#[cfg(feature = "esp")]
pub mod hw;

pub use axis::{Axis, Direction, MotorCommand};
pub use config::{AxisProfile, ControllerConfig, DriveLaw, SiteConfig, TrackerConfig};
pub use controller::{BadReading, Converged, Fault, PositioningController};
pub use ports::{ActuatorPort, IterationSample, LogTelemetry, SensorPort, TelemetryPort};
pub use sun::{SunPosition, TimePos};
pub use tracker::{AxisTargets, TrackReport, Tracker};
