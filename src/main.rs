use std::time::{SystemTime, UNIX_EPOCH};

use esp_idf_svc::hal::{
    delay::FreeRtos,
    gpio::{Gpio6, Output, PinDriver},
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    units::Hertz,
};
use sun_tracker::error::Result;
use sun_tracker::hw::{DcMotor, MotorPair, TiltSensor};
use sun_tracker::{ControllerConfig, LogTelemetry, PositioningController, Tracker, TrackerConfig};

const BLINK_MS: u32 = 250;

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;

    let mut fault_led = PinDriver::output(peripherals.pins.gpio6)?;

    let scl = peripherals.pins.gpio5;
    let sda = peripherals.pins.gpio4;

    let i2c_config = I2cConfig::default().baudrate(Hertz(400000));
    let i2c_driver = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config)?;
    let sensor = TiltSensor::new(i2c_driver)?;

    let vertical = DcMotor::new(
        peripherals.ledc.channel0,
        peripherals.ledc.timer0,
        peripherals.pins.gpio0,
        peripherals.pins.gpio1.downgrade_output(),
    )?;
    let horizontal = DcMotor::new(
        peripherals.ledc.channel1,
        peripherals.ledc.timer1,
        peripherals.pins.gpio3,
        peripherals.pins.gpio7.downgrade_output(),
    )?;
    let motors = MotorPair {
        horizontal,
        vertical,
    };

    let controller =
        PositioningController::new(sensor, motors, FreeRtos, ControllerConfig::default())
            .with_telemetry(LogTelemetry);

    // The arm IMU has no magnetometer, so the base is left where it is.
    let mut tracker = Tracker::new(
        controller,
        TrackerConfig {
            track_horizontal: false,
            ..TrackerConfig::default()
        },
    );

    loop {
        // Expects the RTC to hold UTC.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        match tracker.time_pos(now) {
            Some(when) => {
                let report = tracker.track(&when);
                if let Some(fault) = report.fatal_fault() {
                    log::error!("Tracking halted: {fault}");
                    blink_forever(&mut fault_led);
                }
            }
            None => log::warn!("Clock reads {now}s, outside the calendar; skipping interval"),
        }

        FreeRtos::delay_ms(tracker.interval_ms());
    }
}

fn blink_forever(led: &mut PinDriver<'_, Gpio6, Output>) -> ! {
    loop {
        if let Err(e) = led.toggle() {
            log::warn!("Failed to toggle fault LED: {e:?}");
        }
        FreeRtos::delay_ms(BLINK_MS);
    }
}
