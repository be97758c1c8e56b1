pub mod sidereal;

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::catalog::{Star, StarId};
use crate::error::{Result, SkyViewError};

/// where the observer stands, in degrees. Latitude north positive, longitude east positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverPosition {
    pub lat: f64,
    pub lon: f64,
}

impl ObserverPosition {
    /// Tokyo, used when the position provider is unavailable or denied
    pub const FALLBACK: ObserverPosition = ObserverPosition {
        lat: 35.6762,
        lon: 139.6503,
    };

    pub fn new(lat: f64, lon: f64) -> Result<ObserverPosition> {
        if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) {
            return Err(SkyViewError::InvalidObserver(format!(
                "latitude {} is outside [-90, 90]",
                lat
            )));
        }
        if !(lon.is_finite() && (-180.0..=180.0).contains(&lon)) {
            return Err(SkyViewError::InvalidObserver(format!(
                "longitude {} is outside [-180, 180]",
                lon
            )));
        }
        Ok(ObserverPosition { lat, lon })
    }

    /// short human readable form used in forecast prompts, one decimal
    pub fn describe(&self) -> String {
        format!("{:.1}, {:.1}", self.lat, self.lon)
    }
}

/// The horizontal (alt/az) position of one catalog star at one instant.
///
/// Kept apart from `Star` and joined to it through `star_id`; it lives for one
/// refresh tick and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalPosition {
    pub star_id: StarId,
    /// degrees above the mathematical horizon, [-90, 90]
    pub altitude: f64,
    /// compass bearing in degrees, [0, 360), 0 = north, increasing eastward
    pub azimuth: f64,
    /// `altitude > 0`, no refraction lift
    pub visible: bool,
}

/// the result of one batch transform: every catalog star, in catalog order, at `instant`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkySnapshot {
    pub instant: DateTime<Utc>,
    pub observer: ObserverPosition,
    pub positions: Vec<HorizontalPosition>,
}

impl SkySnapshot {
    pub fn visible(&self) -> impl Iterator<Item = &HorizontalPosition> {
        self.positions.iter().filter(|p| p.visible)
    }

    pub fn position_of(&self, id: StarId) -> Option<&HorizontalPosition> {
        self.positions.iter().find(|p| p.star_id == id)
    }
}

/// wraps an angle in degrees into [0, 360)
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Converts a star's equatorial coordinates into horizontal coordinates for an
/// observer at `instant`.
///
/// Single-epoch and refraction free: no precession, nutation or parallax. Never
/// fails and never returns NaN for a valid catalog star, including observers at
/// a pole and stars at the zenith or nadir, where the azimuth is undefined and
/// an arbitrary but finite bearing comes back.
pub fn transform(
    star: &Star,
    observer: &ObserverPosition,
    instant: &DateTime<Utc>,
) -> HorizontalPosition {
    let lst_deg = sidereal::local_sidereal_hours(instant, observer.lon) * 15.0;
    let hour_angle = wrap_degrees(lst_deg - star.ra);
    let (altitude, azimuth) = horizontal_from_hour_angle(hour_angle, star.dec, observer.lat);
    HorizontalPosition {
        star_id: star.id,
        altitude,
        azimuth,
        visible: altitude > 0.0,
    }
}

/// runs `transform` over every star with one observer and one instant, output order matches input
pub fn transform_all<'a, I>(
    stars: I,
    observer: &ObserverPosition,
    instant: &DateTime<Utc>,
) -> Vec<HorizontalPosition>
where
    I: IntoIterator<Item = &'a Star>,
{
    stars
        .into_iter()
        .map(|star| transform(star, observer, instant))
        .collect()
}

/// hour angle, declination and latitude in degrees to (altitude, azimuth) in degrees
pub fn horizontal_from_hour_angle(hour_angle: f64, dec: f64, lat: f64) -> (f64, f64) {
    let ha = hour_angle.to_radians();
    let dec = dec.to_radians();
    let lat = lat.to_radians();

    let sin_alt = (dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos()).clamp(-1.0, 1.0);
    let alt = sin_alt.asin();

    let denominator = alt.cos() * lat.cos();
    let mut cos_az = (dec.sin() - alt.sin() * lat.sin()) / denominator;
    // observer at a pole or star at zenith/nadir: 0/0 or x/0
    if !cos_az.is_finite() {
        cos_az = 1.0;
    }
    let mut az = cos_az.clamp(-1.0, 1.0).acos().to_degrees();

    // acos cannot tell east of the meridian from west of it
    if ha.sin() > 0.0 {
        az = 360.0 - az;
    }

    (alt.to_degrees().clamp(-90.0, 90.0), wrap_degrees(az))
}
