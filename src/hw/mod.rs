//! ESP32 drivers behind the controller's ports.

pub mod imu;
pub mod motor;

pub use imu::TiltSensor;
pub use motor::{DcMotor, MotorPair};
