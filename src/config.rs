use crate::axis::{Axis, Direction};

/// Iterations a single move may take before giving up.
pub const MAX_CYCLES: u16 = 50;
/// Degrees from the target that count as converged (exclusive).
pub const ALLOWED_ERROR: f32 = 2.;
/// Power added each iteration the error does not move.
pub const STALL_INCREMENT: f32 = 10.;
/// Top of the actuator's duty domain.
pub const SPEED_LIMIT: u16 = 500;

pub const VERTICAL_MIN_TARGET: f32 = 10.;
pub const VERTICAL_MAX_TARGET: f32 = 65.;
/// Mechanical offset between the sun's zenith angle and the arm reading.
pub const VERTICAL_OFFSET: f32 = 5.;
pub const VERTICAL_SETTLE_MS: u32 = 500;
pub const VERTICAL_DOWN_SPEED: f32 = 100.;
pub const VERTICAL_POWER_CONST: f32 = 10.;
pub const VERTICAL_TIME_CONST: f32 = 10.;

pub const HORIZONTAL_MIN_TARGET: f32 = 90.;
pub const HORIZONTAL_MAX_TARGET: f32 = 270.;
pub const HORIZONTAL_SETTLE_MS: u32 = 200;
pub const HORIZONTAL_SPEED: f32 = 25.;
pub const HORIZONTAL_TIME_CONST: f32 = 5.;

/// Magnetic declination for Rochester, NY.
pub const DECLINATION: f32 = -11.25;
pub const LATITUDE: f32 = 43.1566;
pub const LONGITUDE: f32 = -77.6088;
pub const TRACKING_INTERVAL_MINUTES: u32 = 10;

/// How speed and hold time follow from the error on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveLaw {
    /// Fixed duty, hold time proportional to the error.
    Constant { speed: f32, ms_per_degree: f32 },
    /// Gravity-loaded arm upright at 0. Moving away from upright coasts at
    /// a fixed duty; lifting back toward it (counter-clockwise, or clockwise
    /// from behind the stop) needs duty proportional to how far the arm
    /// leans, plus the stall power.
    Lifting {
        down_speed: f32,
        down_ms_per_degree: f32,
        up_speed_per_degree: f32,
        up_ms_per_degree: f32,
    },
}

impl DriveLaw {
    /// Raw (unclamped) speed and hold time in milliseconds.
    pub fn plan(&self, direction: Direction, current: f32, error: f32, stall_power: f32) -> (f32, f32) {
        let magnitude = error.abs();
        match *self {
            DriveLaw::Constant {
                speed,
                ms_per_degree,
            } => (speed, magnitude * ms_per_degree),
            DriveLaw::Lifting {
                down_speed,
                down_ms_per_degree,
                up_speed_per_degree,
                up_ms_per_degree,
            } => {
                let lifting = current < 0. || direction == Direction::CounterClockwise;
                if lifting {
                    (
                        up_speed_per_degree * current.abs() + stall_power,
                        magnitude * up_ms_per_degree,
                    )
                } else {
                    (down_speed, magnitude * down_ms_per_degree)
                }
            }
        }
    }
}

/// Limits, timing and drive law for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisProfile {
    pub target_min: f32,
    pub target_max: f32,
    /// Added to an accepted target before control begins.
    pub target_offset: f32,
    /// Physically possible sensor range; anything else is a sensor fault.
    pub reading_min: f32,
    pub reading_max: f32,
    pub settle_ms: u32,
    /// Readings below this force a clockwise drive.
    pub center: f32,
    pub law: DriveLaw,
}

impl AxisProfile {
    pub fn vertical() -> Self {
        Self {
            target_min: VERTICAL_MIN_TARGET,
            target_max: VERTICAL_MAX_TARGET,
            target_offset: VERTICAL_OFFSET,
            reading_min: -90.,
            reading_max: 90.,
            settle_ms: VERTICAL_SETTLE_MS,
            center: 0.,
            law: DriveLaw::Lifting {
                down_speed: VERTICAL_DOWN_SPEED,
                down_ms_per_degree: 1.,
                up_speed_per_degree: VERTICAL_POWER_CONST,
                up_ms_per_degree: VERTICAL_TIME_CONST,
            },
        }
    }

    pub fn horizontal() -> Self {
        Self {
            target_min: HORIZONTAL_MIN_TARGET,
            target_max: HORIZONTAL_MAX_TARGET,
            target_offset: 0.,
            reading_min: 0.,
            reading_max: 360.,
            settle_ms: HORIZONTAL_SETTLE_MS,
            center: 0.,
            law: DriveLaw::Constant {
                speed: HORIZONTAL_SPEED,
                ms_per_degree: HORIZONTAL_TIME_CONST,
            },
        }
    }

    /// NaN is never accepted.
    pub fn accepts_target(&self, target: f32) -> bool {
        (self.target_min..=self.target_max).contains(&target)
    }

    pub fn accepts_reading(&self, reading: f32) -> bool {
        (self.reading_min..=self.reading_max).contains(&reading)
    }

    pub fn clamp_target(&self, target: f32) -> f32 {
        target.clamp(self.target_min, self.target_max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub max_cycles: u16,
    pub allowed_error: f32,
    pub stall_increment: f32,
    pub speed_limit: u16,
    pub vertical: AxisProfile,
    pub horizontal: AxisProfile,
}

impl ControllerConfig {
    pub fn profile(&self, axis: Axis) -> &AxisProfile {
        match axis {
            Axis::Vertical => &self.vertical,
            Axis::Horizontal => &self.horizontal,
        }
    }

    /// Rounds and clamps a raw speed into `[0, speed_limit]`.
    pub fn clamp_speed(&self, raw: f32) -> u16 {
        raw.round().clamp(0., self.speed_limit as f32) as u16
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_cycles: MAX_CYCLES,
            allowed_error: ALLOWED_ERROR,
            stall_increment: STALL_INCREMENT,
            speed_limit: SPEED_LIMIT,
            vertical: AxisProfile::vertical(),
            horizontal: AxisProfile::horizontal(),
        }
    }
}

/// Where the tracker stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteConfig {
    pub latitude: f32,
    pub longitude: f32,
    pub declination: f32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude: LATITUDE,
            longitude: LONGITUDE,
            declination: DECLINATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    pub site: SiteConfig,
    pub interval_minutes: u32,
    pub track_horizontal: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            interval_minutes: TRACKING_INTERVAL_MINUTES,
            track_horizontal: true,
        }
    }
}
