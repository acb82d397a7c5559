//! One tracking interval: sun position in, both axes moved, outcome out.
//!
//! Axes are moved one after the other, vertical first. They have separate
//! motor outputs but simultaneous motor draw was never validated.

use embedded_hal::delay::DelayNs;

use crate::config::{ControllerConfig, TrackerConfig};
use crate::controller::{Converged, Fault, PositioningController};
use crate::ports::{ActuatorPort, SensorPort, TelemetryPort};
use crate::sun::{sun_position, SunPosition, TimePos};

/// Targets handed to the controller, already inside each axis range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTargets {
    pub vertical: f32,
    pub horizontal: f32,
}

/// Maps the sun onto axis targets. `None` while the sun is below the horizon.
pub fn targets_for(sun: &SunPosition, config: &ControllerConfig) -> Option<AxisTargets> {
    if !sun.is_up() {
        return None;
    }

    Some(AxisTargets {
        vertical: config.vertical.clamp_target(sun.zenith),
        horizontal: config.horizontal.clamp_target(sun.azimuth),
    })
}

/// What happened during one interval. `None` means the axis was not moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackReport {
    pub sun: SunPosition,
    pub targets: Option<AxisTargets>,
    pub vertical: Option<Result<Converged, Fault>>,
    pub horizontal: Option<Result<Converged, Fault>>,
}

impl TrackReport {
    /// First fault that should stop tracking altogether.
    pub fn fatal_fault(&self) -> Option<Fault> {
        [self.vertical, self.horizontal]
            .into_iter()
            .flatten()
            .filter_map(Result::err)
            .find(Fault::is_fatal)
    }
}

pub struct Tracker<S, A, D, T = ()> {
    controller: PositioningController<S, A, D, T>,
    config: TrackerConfig,
}

impl<S, A, D, T> Tracker<S, A, D, T>
where
    S: SensorPort,
    A: ActuatorPort,
    D: DelayNs,
    T: TelemetryPort,
{
    pub fn new(controller: PositioningController<S, A, D, T>, config: TrackerConfig) -> Self {
        Self { controller, config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn controller(&mut self) -> &mut PositioningController<S, A, D, T> {
        &mut self.controller
    }

    /// Milliseconds to wait between intervals.
    pub fn interval_ms(&self) -> u32 {
        self.config.interval_minutes * 60_000
    }

    /// Position sample for `unix_seconds` at the configured site.
    pub fn time_pos(&self, unix_seconds: i64) -> Option<TimePos> {
        let site = &self.config.site;
        TimePos::from_unix(unix_seconds, site.latitude, site.longitude)
    }

    pub fn track(&mut self, when: &TimePos) -> TrackReport {
        let sun = sun_position(when);
        let targets = targets_for(&sun, self.controller.config());
        let mut report = TrackReport {
            sun,
            targets,
            vertical: None,
            horizontal: None,
        };

        let Some(targets) = targets else {
            log::info!("Sun is down (zenith {}), holding position", sun.zenith);
            return report;
        };
        log::info!(
            "Sun at zenith {} azimuth {}, targets {:?}",
            sun.zenith,
            sun.azimuth,
            targets
        );

        let vertical = self.controller.move_vertical_to_angle(targets.vertical);
        report.vertical = Some(vertical);
        if let Err(fault) = vertical {
            if fault.is_fatal() {
                log::error!("Stopping interval: {fault}");
                return report;
            }
            log::warn!("{fault}");
        }

        if self.config.track_horizontal {
            let horizontal = self.controller.move_horizontal_to_angle(targets.horizontal);
            if let Err(fault) = horizontal {
                log::warn!("{fault}");
            }
            report.horizontal = Some(horizontal);
        }

        report
    }
}
