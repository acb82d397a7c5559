//! Per-axis positioning loop.
//!
//! Each call to [`PositioningController::move_to_angle`] starts from a fresh
//! [`ControlState`] and runs to completion: settle, read, compare, drive for a
//! computed hold time, stop, repeat. It ends on convergence, on a bad sensor
//! reading, or after `max_cycles` iterations. Nothing survives between calls.

use derive_more::Display;
use embedded_hal::delay::DelayNs;

use crate::axis::{Axis, Direction, MotorCommand};
use crate::config::ControllerConfig;
use crate::ports::{ActuatorPort, IterationSample, SensorPort, TelemetryPort};

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum BadReading {
    #[display("reading {_0} outside physical range")]
    OutOfBounds(f32),
    #[display("sensor could not be read")]
    Unreadable,
}

/// Why a move ended without reaching its target.
#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum Fault {
    #[display("{axis}: target {target} outside {min}..={max}")]
    InvalidTarget {
        axis: Axis,
        target: f32,
        min: f32,
        max: f32,
    },
    #[display("{axis}: {reading}")]
    SensorFault { axis: Axis, reading: BadReading },
    #[display("{axis}: no convergence after {cycles} cycles, last error {last_error}")]
    CycleExhausted {
        axis: Axis,
        cycles: u16,
        last_error: f32,
    },
    #[display("{axis}: actuator rejected a command")]
    Actuator { axis: Axis },
}

impl Fault {
    /// Faults that repetition will not fix. The caller should stop tracking
    /// and raise its fault indicator.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Fault::SensorFault { .. } | Fault::Actuator { .. })
    }
}

impl std::error::Error for Fault {}

/// Result of a successful move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converged {
    pub axis: Axis,
    /// Last reading, inside tolerance of the target.
    pub angle: f32,
    pub error: f32,
    /// Motor commands issued before convergence.
    pub cycles: u16,
}

/// Loop state of a single move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    /// Target after the axis offset has been applied.
    pub target: f32,
    /// `None` until the first iteration has completed.
    pub last_error: Option<f32>,
    pub stall_power: f32,
    pub cycle_count: u16,
}

impl ControlState {
    pub fn new(target: f32) -> Self {
        Self {
            target,
            last_error: None,
            stall_power: 0.,
            cycle_count: 0,
        }
    }

    /// Bumps the stall power when the error has not moved since the last
    /// iteration, otherwise drops it back to zero.
    pub fn observe(&mut self, error: f32, increment: f32) {
        match self.last_error {
            Some(last) if last == error => self.stall_power += increment,
            _ => self.stall_power = 0.,
        }
    }

    pub fn advance(&mut self, error: f32) {
        self.last_error = Some(error);
        self.cycle_count += 1;
    }
}

pub struct PositioningController<S, A, D, T = ()> {
    sensor: S,
    actuator: A,
    delay: D,
    telemetry: T,
    config: ControllerConfig,
}

impl<S, A, D> PositioningController<S, A, D>
where
    S: SensorPort,
    A: ActuatorPort,
    D: DelayNs,
{
    pub fn new(sensor: S, actuator: A, delay: D, config: ControllerConfig) -> Self {
        Self {
            sensor,
            actuator,
            delay,
            telemetry: (),
            config,
        }
    }
}

impl<S, A, D, T> PositioningController<S, A, D, T>
where
    S: SensorPort,
    A: ActuatorPort,
    D: DelayNs,
    T: TelemetryPort,
{
    pub fn with_telemetry<U: TelemetryPort>(self, telemetry: U) -> PositioningController<S, A, D, U> {
        PositioningController {
            sensor: self.sensor,
            actuator: self.actuator,
            delay: self.delay,
            telemetry,
            config: self.config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn release(self) -> (S, A, D, T) {
        (self.sensor, self.actuator, self.delay, self.telemetry)
    }

    pub fn move_vertical_to_angle(&mut self, target: f32) -> Result<Converged, Fault> {
        self.move_to_angle(Axis::Vertical, target)
    }

    pub fn move_horizontal_to_angle(&mut self, target: f32) -> Result<Converged, Fault> {
        self.move_to_angle(Axis::Horizontal, target)
    }

    /// Drives `axis` until its reading is within `allowed_error` of `target`.
    ///
    /// An out-of-range target is rejected before anything moves. Every drive
    /// is followed by a stop before the next reading.
    pub fn move_to_angle(&mut self, axis: Axis, target: f32) -> Result<Converged, Fault> {
        let profile = *self.config.profile(axis);
        if !profile.accepts_target(target) {
            log::error!("{axis}: rejecting target {target}");
            return Err(Fault::InvalidTarget {
                axis,
                target,
                min: profile.target_min,
                max: profile.target_max,
            });
        }

        let mut state = ControlState::new(target + profile.target_offset);
        log::info!("{axis}: moving to {} (requested {target})", state.target);

        while state.cycle_count < self.config.max_cycles {
            self.delay.delay_ms(profile.settle_ms);

            let angle = self.read(axis)?;
            let error = state.target - angle;

            if error.abs() < self.config.allowed_error {
                log::info!(
                    "{axis}: converged at {angle} after {} cycles",
                    state.cycle_count
                );
                return Ok(Converged {
                    axis,
                    angle,
                    error,
                    cycles: state.cycle_count,
                });
            }

            state.observe(error, self.config.stall_increment);

            let direction = Direction::select(angle, error, profile.center);
            let (raw_speed, raw_hold) = profile.law.plan(direction, angle, error, state.stall_power);
            let command = MotorCommand {
                axis,
                direction,
                speed: self.config.clamp_speed(raw_speed),
                hold_ms: raw_hold.round() as u32,
            };

            let sample = IterationSample {
                axis,
                cycle: state.cycle_count,
                angle,
                error,
                speed: command.speed,
                direction,
                hold_ms: command.hold_ms,
                stall_power: state.stall_power,
            };
            log::debug!("{sample}");
            self.telemetry.emit(&sample);

            self.actuate(&command)?;
            state.advance(error);
        }

        let last_error = state.last_error.unwrap_or(0.);
        log::warn!(
            "{axis}: gave up after {} cycles, last error {last_error}",
            state.cycle_count
        );
        Err(Fault::CycleExhausted {
            axis,
            cycles: state.cycle_count,
            last_error,
        })
    }

    fn read(&mut self, axis: Axis) -> Result<f32, Fault> {
        let angle = self.sensor.read_angle(axis).map_err(|e| {
            log::error!("{axis}: sensor read failed: {e:?}");
            Fault::SensorFault {
                axis,
                reading: BadReading::Unreadable,
            }
        })?;

        if !self.config.profile(axis).accepts_reading(angle) {
            log::error!("{axis}: reading {angle} is physically impossible");
            return Err(Fault::SensorFault {
                axis,
                reading: BadReading::OutOfBounds(angle),
            });
        }

        Ok(angle)
    }

    /// Drive, hold, stop. The stop is sent even when the drive failed.
    fn actuate(&mut self, command: &MotorCommand) -> Result<(), Fault> {
        let axis = command.axis;
        let driven = self.actuator.drive(axis, command.direction, command.speed);
        if driven.is_ok() {
            self.delay.delay_ms(command.hold_ms);
        }
        let stopped = self.actuator.stop(axis);

        if let Err(e) = driven {
            log::error!("{axis}: drive failed: {e:?}");
            return Err(Fault::Actuator { axis });
        }
        if let Err(e) = stopped {
            log::error!("{axis}: stop failed: {e:?}");
            return Err(Fault::Actuator { axis });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_iteration_never_counts_as_stall() {
        let mut state = ControlState::new(45.);
        state.observe(0., 10.);
        assert_eq!(state.stall_power, 0.);
    }

    #[test]
    fn repeated_error_grows_stall_power() {
        let mut state = ControlState::new(45.);
        state.observe(-7., 10.);
        state.advance(-7.);
        state.observe(-7., 10.);
        assert_eq!(state.stall_power, 10.);
        state.advance(-7.);
        state.observe(-7., 10.);
        assert_eq!(state.stall_power, 20.);
    }

    #[test]
    fn changed_error_resets_stall_power() {
        let mut state = ControlState::new(45.);
        state.advance(-7.);
        state.observe(-7., 10.);
        state.advance(-7.);
        state.observe(-6., 10.);
        assert_eq!(state.stall_power, 0.);
    }

    #[test]
    fn advance_counts_cycles() {
        let mut state = ControlState::new(45.);
        state.advance(3.);
        state.advance(2.);
        assert_eq!(state.cycle_count, 2);
        assert_eq!(state.last_error, Some(2.));
    }

    #[test]
    fn only_hardware_faults_are_fatal() {
        let axis = Axis::Vertical;
        assert!(Fault::SensorFault {
            axis,
            reading: BadReading::Unreadable
        }
        .is_fatal());
        assert!(Fault::Actuator { axis }.is_fatal());
        assert!(!Fault::CycleExhausted {
            axis,
            cycles: 50,
            last_error: 4.
        }
        .is_fatal());
    }

    #[test]
    fn fault_message_names_axis() {
        let fault = Fault::SensorFault {
            axis: Axis::Horizontal,
            reading: BadReading::OutOfBounds(400.),
        };
        assert_eq!(
            fault.to_string(),
            "Horizontal: reading 400 outside physical range"
        );
    }
}
