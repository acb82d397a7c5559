use derive_more::Display;

/// One of the two tracker axes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Compass heading, driven by the base motor.
    Horizontal,
    /// Zenith angle, driven by the arm motor.
    Vertical,
}

/// Direction of motor rotation.
///
/// On the vertical axis clockwise lowers the arm (zenith angle grows), on the
/// horizontal axis it increases the compass heading.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[display("CW")]
    Clockwise,
    #[display("CCW")]
    CounterClockwise,
}

impl Direction {
    /// Picks the direction for one iteration.
    ///
    /// A reading below `center` always drives clockwise, back toward the
    /// mechanical stop, whatever the sign of the error.
    pub fn select(current: f32, error: f32, center: f32) -> Self {
        if current < center || error > 0. {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}

/// A single drive request. Speed is already clamped to the actuator's duty
/// domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub axis: Axis,
    pub direction: Direction,
    pub speed: u16,
    pub hold_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_error_drives_clockwise() {
        assert_eq!(Direction::select(20., 5., 0.), Direction::Clockwise);
    }

    #[test]
    fn negative_error_drives_counter_clockwise() {
        assert_eq!(Direction::select(20., -5., 0.), Direction::CounterClockwise);
    }

    #[test]
    fn reading_below_center_forces_clockwise() {
        assert_eq!(Direction::select(-3., -40., 0.), Direction::Clockwise);
    }

    #[test]
    fn display_is_short() {
        assert_eq!(Direction::Clockwise.to_string(), "CW");
        assert_eq!(Axis::Vertical.to_string(), "Vertical");
    }
}
