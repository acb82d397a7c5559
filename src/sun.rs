//! Sun position from date, time of day and site, using the subsolar point.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Instant and place of a tracking sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePos {
    /// Day of the year, Jan 1 = 1.
    pub ordinal_date: u16,
    /// Minutes since UTC midnight.
    pub minute_of_day: u16,
    pub latitude: f32,
    /// East positive.
    pub longitude: f32,
}

impl TimePos {
    pub fn from_utc(when: &DateTime<Utc>, latitude: f32, longitude: f32) -> Self {
        Self {
            ordinal_date: when.ordinal() as u16,
            minute_of_day: (when.num_seconds_from_midnight() / 60) as u16,
            latitude,
            longitude,
        }
    }

    /// `None` when `seconds` is beyond the calendar chrono can represent.
    pub fn from_unix(seconds: i64, latitude: f32, longitude: f32) -> Option<Self> {
        let when = DateTime::from_timestamp(seconds, 0)?;
        Some(Self::from_utc(&when, latitude, longitude))
    }
}

/// Degrees. Azimuth runs clockwise from north in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub zenith: f32,
    pub azimuth: f32,
}

impl SunPosition {
    pub fn is_up(&self) -> bool {
        self.zenith < 90.
    }
}

/// Solar declination in radians.
fn declination(ordinal_date: u16) -> f32 {
    let n = ordinal_date as f32 - 1.;
    -(0.39779 * (0.017203 * (n + 10.) + 0.033406 * (0.017203 * (n - 2.)).sin()).cos()).asin()
}

pub fn sun_position(when: &TimePos) -> SunPosition {
    let decl = declination(when.ordinal_date);

    let hours = when.minute_of_day as f32 / 60.;
    let subsolar_longitude = -15. * (hours - 12.);
    let dl = (subsolar_longitude - when.longitude).to_radians();
    let phi = when.latitude.to_radians();

    let sx = decl.cos() * dl.sin();
    let sy = phi.cos() * decl.sin() - phi.sin() * decl.cos() * dl.cos();
    let sz = phi.sin() * decl.sin() + phi.cos() * decl.cos() * dl.cos();

    SunPosition {
        zenith: sz.clamp(-1., 1.).acos().to_degrees(),
        azimuth: sx.atan2(sy).to_degrees().rem_euclid(360.),
    }
}
