//! Seams between the positioning loop and the hardware.
//!
//! The controller never touches registers: it reads angles through a
//! [`SensorPort`], drives motors through an [`ActuatorPort`] and reports each
//! iteration to a [`TelemetryPort`]. Concrete drivers (or test doubles) are
//! injected by the caller.

use core::fmt;

use derive_more::Display;

use crate::axis::{Axis, Direction};

/// Source of the current angle of an axis, in degrees.
pub trait SensorPort {
    type Error: fmt::Debug;

    fn read_angle(&mut self, axis: Axis) -> Result<f32, Self::Error>;
}

/// Motor outputs for both axes. `speed` is in `[0, SPEED_LIMIT]`.
pub trait ActuatorPort {
    type Error: fmt::Debug;

    fn drive(&mut self, axis: Axis, direction: Direction, speed: u16) -> Result<(), Self::Error>;

    fn stop(&mut self, axis: Axis) -> Result<(), Self::Error>;
}

/// Side channel for per-iteration diagnostics. Must not block for long and
/// has no say in control decisions.
pub trait TelemetryPort {
    fn emit(&mut self, sample: &IterationSample);
}

/// What the controller saw and decided during one iteration.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
#[display(
    "{axis} #{cycle}: angle={angle:.1} error={error:.1} speed={speed} dir={direction} hold={hold_ms}ms stall={stall_power}"
)]
pub struct IterationSample {
    pub axis: Axis,
    pub cycle: u16,
    pub angle: f32,
    pub error: f32,
    pub speed: u16,
    pub direction: Direction,
    pub hold_ms: u32,
    pub stall_power: f32,
}

impl<T: SensorPort + ?Sized> SensorPort for &mut T {
    type Error = T::Error;

    fn read_angle(&mut self, axis: Axis) -> Result<f32, Self::Error> {
        T::read_angle(self, axis)
    }
}

impl<T: ActuatorPort + ?Sized> ActuatorPort for &mut T {
    type Error = T::Error;

    fn drive(&mut self, axis: Axis, direction: Direction, speed: u16) -> Result<(), Self::Error> {
        T::drive(self, axis, direction, speed)
    }

    fn stop(&mut self, axis: Axis) -> Result<(), Self::Error> {
        T::stop(self, axis)
    }
}

impl<T: TelemetryPort + ?Sized> TelemetryPort for &mut T {
    fn emit(&mut self, sample: &IterationSample) {
        T::emit(self, sample)
    }
}

/// No telemetry.
impl TelemetryPort for () {
    fn emit(&mut self, _sample: &IterationSample) {}
}

/// Writes every sample as a line on the `telemetry` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl TelemetryPort for LogTelemetry {
    fn emit(&mut self, sample: &IterationSample) {
        log::info!(target: "telemetry", "{sample}");
    }
}
