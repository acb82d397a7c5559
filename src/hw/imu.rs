use std::time::SystemTime;

use derive_more::Display;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::i2c::I2cDriver;
use mpu6050::device::AccelRange;
use mpu6050::Mpu6050;

use crate::axis::Axis;
use crate::error::Result;
use crate::heading::{is_at_rest, zenith_from_accel};
use crate::ports::SensorPort;

/// Accelerometer samples averaged into one reading.
const SAMPLES_PER_READ: u16 = 16;
/// Samples thrown away after power-up while the accelerometer filter fills.
const WARM_UP_SAMPLES: u16 = 8;
const SAMPLE_SPACING_MS: u32 = 2;

#[derive(Debug, Display)]
pub enum Error {
    #[display("Accelerometer setup failed at {_0}")]
    Setup(&'static str),
    GetAccel,
    #[display("Arm still moving, measured {_0:?} g")]
    NotAtRest([f32; 3]),
    #[display("No sensor for the {_0} axis")]
    NoSource(Axis),
}

/// MPU6050 on the tracker arm, read as the vertical axis angle.
///
/// Only the accelerometer is used: the arm is at rest when it is read, so
/// gravity alone gives its lean.
pub struct TiltSensor<'a> {
    mpu: Mpu6050<I2cDriver<'a>>,
}

impl<'a> TiltSensor<'a> {
    pub fn new(i2c: I2cDriver<'a>) -> Result<TiltSensor<'a>> {
        let mut delay = FreeRtos;
        let mut mpu = Mpu6050::new(i2c);

        log::info!("Waking accelerometer...");
        mpu.init(&mut delay).map_err(|_| Error::Setup("wake-up"))?;
        // At rest the arm only sees 1 g.
        mpu.set_accel_range(AccelRange::G2)
            .map_err(|_| Error::Setup("accel range"))?;
        mpu.set_temp_enabled(false)
            .map_err(|_| Error::Setup("temperature off"))?;

        let mut sensor = Self { mpu };
        for _ in 0..WARM_UP_SAMPLES {
            sensor.sample()?;
            FreeRtos::delay_ms(SAMPLE_SPACING_MS);
        }
        log::info!("Accelerometer ready.");

        Ok(sensor)
    }

    fn sample(&mut self) -> Result<[f32; 3]> {
        let acc = self.mpu.get_acc().map_err(|_| Error::GetAccel)?;
        Ok([acc.x, acc.y, acc.z])
    }

    /// Mean acceleration over [`SAMPLES_PER_READ`] samples, in g.
    fn mean_accel(&mut self) -> Result<[f32; 3]> {
        let mut sum = [0_f32; 3];

        let start_time = SystemTime::now();
        for _ in 0..SAMPLES_PER_READ {
            let acc = self.sample()?;
            sum.iter_mut().zip(acc).for_each(|(s, a)| *s += a);
            FreeRtos::delay_ms(SAMPLE_SPACING_MS);
        }
        log::trace!(
            "Averaged {SAMPLES_PER_READ} samples in {}ms",
            SystemTime::now()
                .duration_since(start_time)
                .unwrap_or_default()
                .as_millis()
        );

        Ok(sum.map(|s| s / SAMPLES_PER_READ as f32))
    }

    fn zenith(&mut self) -> Result<f32> {
        let accel = self.mean_accel()?;
        if !is_at_rest(accel) {
            return Err(Error::NotAtRest(accel).into());
        }
        let [x, y, z] = accel;
        Ok(zenith_from_accel(x, y, z))
    }
}

impl SensorPort for TiltSensor<'_> {
    type Error = crate::error::Error;

    fn read_angle(&mut self, axis: Axis) -> Result<f32> {
        match axis {
            Axis::Vertical => self.zenith(),
            Axis::Horizontal => Err(Error::NoSource(axis).into()),
        }
    }
}
