pub mod graticule;
pub mod render;

use nalgebra::{Rotation3, Vector3};
use serde_derive::{Deserialize, Serialize};

use crate::orientation::Orientation;
pub use render::{
    cardinal_direction, glow_radius, render_frame, Compass, Frame, HitTarget, Primitive,
    ProjectedStar, RenderSettings, TextAnchor,
};

/// a position on the render surface in pixels, y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint { x, y }
    }

    pub fn distance(&self, other: &ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport { width, height }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// unit vector of a horizontal direction, azimuth as longitude and altitude as latitude
fn horizontal_unit_vector(azimuth: f64, altitude: f64) -> Vector3<f64> {
    let (az_sin, az_cos) = azimuth.to_radians().sin_cos();
    let (alt_sin, alt_cos) = altitude.to_radians().sin_cos();
    Vector3::new(alt_cos * az_cos, alt_cos * az_sin, alt_sin)
}

/// Stereographic projection of the horizontal sphere centred on the view direction.
///
/// The sky is rotated by (-azimuth, -altitude, 0): first about the zenith axis
/// by -azimuth, then about the east-west axis so the view direction lands on
/// +x. Points at or beyond `clip_angle` degrees from the centre project to
/// nothing. Screen x grows with azimuth and screen y shrinks with altitude.
#[derive(Debug, Clone)]
pub struct StereographicProjection {
    rotation: Rotation3<f64>,
    scale: f64,
    center: ScreenPoint,
    clip_cos: f64,
}

impl StereographicProjection {
    pub fn new(
        view: &Orientation,
        viewport: &Viewport,
        scale: f64,
        clip_angle: f64,
    ) -> StereographicProjection {
        let yaw = Rotation3::from_axis_angle(&Vector3::z_axis(), -view.azimuth.to_radians());
        let pitch = Rotation3::from_axis_angle(&Vector3::y_axis(), view.altitude.to_radians());
        StereographicProjection {
            rotation: pitch * yaw,
            scale,
            center: viewport.center(),
            clip_cos: clip_angle.to_radians().cos(),
        }
    }

    /// screen position of a horizontal direction, `None` when it lies outside the clip circle
    pub fn project(&self, azimuth: f64, altitude: f64) -> Option<ScreenPoint> {
        let v = self.rotation * horizontal_unit_vector(azimuth, altitude);
        // v.x is the cosine of the angular distance from the view centre
        if v.x <= self.clip_cos {
            return None;
        }
        let k = 1.0 + v.x;
        Some(ScreenPoint::new(
            self.center.x + self.scale * v.y / k,
            self.center.y - self.scale * v.z / k,
        ))
    }
}
