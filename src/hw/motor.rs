use derive_more::Display;
use esp_idf_svc::{
    hal::{
        gpio::{AnyOutputPin, Output, OutputPin, PinDriver},
        ledc::{
            config::TimerConfig, LedcChannel, LedcDriver, LedcTimer, LedcTimerDriver, Resolution,
        },
        peripheral::Peripheral,
        units::Hertz,
    },
    sys::EspError,
};

use crate::axis::{Axis, Direction};
use crate::config::SPEED_LIMIT;
use crate::error::Result;
use crate::ports::ActuatorPort;

const FREQ_HZ: Hertz = Hertz(8_000);
const RESOLUTION: Resolution = Resolution::Bits10;

#[derive(Debug, Display)]
pub enum Error {
    #[display("Failed to create LedcTimerDriver. Error: {_0:?}")]
    CreateLedcTimerDriver(EspError),
    #[display("Failed to create LedcDriver. Error: {_0:?}")]
    CreateLedcDriver(EspError),
    #[display("Failed to create direction pin driver. Error: {_0:?}")]
    CreateDirectionPin(EspError),
    #[display("Failed to set duty cycle with value {value}. Error: {error:?}")]
    SetDuty { value: u32, error: EspError },
    #[display("Failed to set direction pin. Error: {_0:?}")]
    SetDirection(EspError),
}

/// Brushed DC motor on an H-bridge: PWM on one pin, direction on another.
pub struct DcMotor<'a> {
    driver: LedcDriver<'a>,
    direction: PinDriver<'a, AnyOutputPin, Output>,
    max_duty: u32,
}

impl<'a> DcMotor<'a> {
    pub fn new<C: LedcChannel<SpeedMode = <T>::SpeedMode>, T: LedcTimer + 'a>(
        channel: impl Peripheral<P = C> + 'a,
        timer: impl Peripheral<P = T> + 'a,
        pwm: impl Peripheral<P = impl OutputPin> + 'a,
        direction: AnyOutputPin,
    ) -> Result<Self> {
        let timer_config = TimerConfig {
            frequency: FREQ_HZ,
            resolution: RESOLUTION,
        };
        let timer_driver =
            LedcTimerDriver::new(timer, &timer_config).map_err(Error::CreateLedcTimerDriver)?;
        let mut driver =
            LedcDriver::new(channel, timer_driver, pwm).map_err(Error::CreateLedcDriver)?;
        driver.set_duty(0).map_err(|e| Error::SetDuty { value: 0, error: e })?;
        log::info!("LedcDriver created.");

        let direction = PinDriver::output(direction).map_err(Error::CreateDirectionPin)?;
        let max_duty = driver.get_max_duty();

        Ok(Self {
            driver,
            direction,
            max_duty,
        })
    }

    /// `speed` is in `[0, SPEED_LIMIT]`; larger values run at full duty.
    pub fn run(&mut self, direction: Direction, speed: u16) -> Result<()> {
        let level = match direction {
            Direction::Clockwise => self.direction.set_low(),
            Direction::CounterClockwise => self.direction.set_high(),
        };
        level.map_err(Error::SetDirection)?;

        let duty = self.max_duty * u32::from(speed.min(SPEED_LIMIT)) / u32::from(SPEED_LIMIT);
        self.set_duty(duty)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.set_duty(0)
    }

    fn set_duty(&mut self, duty: u32) -> Result<()> {
        self.driver.set_duty(duty).map_err(|e| Error::SetDuty {
            value: duty,
            error: e,
        })?;

        Ok(())
    }
}

/// The tracker's two motors behind one actuator port.
pub struct MotorPair<'a> {
    pub horizontal: DcMotor<'a>,
    pub vertical: DcMotor<'a>,
}

impl<'a> MotorPair<'a> {
    fn motor(&mut self, axis: Axis) -> &mut DcMotor<'a> {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}

impl ActuatorPort for MotorPair<'_> {
    type Error = crate::error::Error;

    fn drive(&mut self, axis: Axis, direction: Direction, speed: u16) -> Result<()> {
        self.motor(axis).run(direction, speed)
    }

    fn stop(&mut self, axis: Axis) -> Result<()> {
        self.motor(axis).stop()
    }
}
