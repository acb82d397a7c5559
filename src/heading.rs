//! Axis angles from raw sensor vectors.
//!
//! Both sensors are mounted with their `y` axis along the tracker arm, so a
//! level, upright board reads gravity on `+y`.

/// Signed lean of the arm from vertical toward `+x`, in degrees.
///
/// An upright arm reads 0. An arm hanging upside down reads beyond ±90, which
/// the controller rejects as a sensor fault.
pub fn zenith_from_accel(x: f32, y: f32, _z: f32) -> f32 {
    x.atan2(y).to_degrees()
}

/// Largest departure from 1 g, in g, for an averaged accelerometer vector to
/// count as gravity alone.
pub const REST_TOLERANCE: f32 = 0.1;

/// Whether `accel` (in g) measures gravity only, so the arm is not swinging
/// or still coasting after a drive.
pub fn is_at_rest(accel: [f32; 3]) -> bool {
    let [x, y, z] = accel;
    ((x * x + y * y + z * z).sqrt() - 1.).abs() <= REST_TOLERANCE
}

/// Tilt-compensated compass heading in `[0, 360)` degrees, corrected by the
/// site's magnetic `declination`.
///
/// Degenerate input (no gravity, no field) yields NaN.
pub fn compass_heading(accel: [f32; 3], mag: [f32; 3], declination: f32) -> f32 {
    let [ax, ay, az] = accel;
    let [mx, my, mz] = mag;

    let roll = ax.atan2(ay);
    let pitch = -(az / (ax * roll.sin() + ay * roll.cos())).atan();

    let yaw = (mx * roll.sin() * pitch.sin() + my * roll.cos() * pitch.sin() + mz * pitch.cos())
        .atan2(mx * roll.cos() - my * roll.sin());

    (90. + declination - yaw.to_degrees()).rem_euclid(360.)
}
