pub mod device;

use serde_derive::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::coordinates::wrap_degrees;
use crate::projection::ScreenPoint;
use device::DeviceLink;

/// degrees of rotation per pixel of drag
pub const DEFAULT_SENSITIVITY: f64 = 0.2;

/// The direction the view faces, in degrees.
///
/// `new`, the drag and sample mappings and deserialization wrap azimuth into
/// [0, 360) and clamp altitude into [0, 90]. The fields are public for reading;
/// a value built by hand is normalised again when handed to `OrientationModel`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOrientation")]
pub struct Orientation {
    pub azimuth: f64,
    pub altitude: f64,
}

impl Default for Orientation {
    /// looking south, 45 degrees up
    fn default() -> Self {
        Orientation {
            azimuth: 180.0,
            altitude: 45.0,
        }
    }
}

impl Orientation {
    pub fn new(azimuth: f64, altitude: f64) -> Orientation {
        Orientation {
            azimuth: wrap_degrees(azimuth),
            altitude: altitude.clamp(0.0, 90.0),
        }
    }

    /// Maps a device sample onto a view direction. Compass heading is inverted
    /// so turning the device rotates the sky the same way a drag does.
    pub fn from_sample(sample: &OrientationSample) -> Orientation {
        let alpha = sample.alpha.filter(|a| a.is_finite()).unwrap_or(0.0);
        let beta = sample.beta.filter(|b| b.is_finite()).unwrap_or(0.0);
        Orientation::new(360.0 - alpha, beta)
    }

    /// the orientation after a drag of (dx, dy) pixels
    pub fn dragged(&self, dx: f64, dy: f64, sensitivity: f64) -> Orientation {
        Orientation::new(
            self.azimuth - dx * sensitivity,
            self.altitude + dy * sensitivity,
        )
    }
}

#[derive(Deserialize)]
struct RawOrientation {
    azimuth: f64,
    altitude: f64,
}

impl From<RawOrientation> for Orientation {
    fn from(raw: RawOrientation) -> Orientation {
        Orientation::new(raw.azimuth, raw.altitude)
    }
}

/// one reading of the device orientation sensor, fields the platform did not fill are `None`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    /// compass heading, degrees
    pub alpha: Option<f64>,
    /// front-back tilt, degrees, signed
    pub beta: Option<f64>,
}

impl OrientationSample {
    pub fn new(alpha: f64, beta: f64) -> OrientationSample {
        OrientationSample {
            alpha: Some(alpha),
            beta: Some(beta),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationMode {
    Manual,
    Sensor,
}

/// Current view direction plus the input source allowed to change it.
///
/// In `Manual` mode only drag gestures move the view, in `Sensor` mode only
/// device samples do. Drag events still arrive in sensor mode (the reference
/// point keeps tracking the pointer) but never touch the orientation.
#[derive(Debug, Clone)]
pub struct OrientationModel {
    orientation: Orientation,
    mode: OrientationMode,
    /// last pointer position of the active drag, `None` outside a drag
    drag_anchor: Option<ScreenPoint>,
    sensitivity: f64,
}

impl Default for OrientationModel {
    fn default() -> Self {
        OrientationModel::new(Orientation::default(), DEFAULT_SENSITIVITY)
    }
}

impl OrientationModel {
    pub fn new(initial: Orientation, sensitivity: f64) -> OrientationModel {
        OrientationModel {
            orientation: Orientation::new(initial.azimuth, initial.altitude),
            mode: OrientationMode::Manual,
            drag_anchor: None,
            sensitivity,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn mode(&self) -> OrientationMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn begin_drag(&mut self, point: ScreenPoint) {
        self.drag_anchor = Some(point);
    }

    /// Feeds the next pointer position of a drag. Returns true when the
    /// orientation changed.
    pub fn drag_to(&mut self, point: ScreenPoint) -> bool {
        let Some(anchor) = self.drag_anchor.replace(point) else {
            // not dragging, nothing to compare against
            return false;
        };
        if self.mode != OrientationMode::Manual {
            return false;
        }
        self.apply_drag_delta(point.x - anchor.x, point.y - anchor.y)
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// applies a pixel delta in manual mode, returns true when the orientation changed
    pub fn apply_drag_delta(&mut self, dx: f64, dy: f64) -> bool {
        if self.mode != OrientationMode::Manual {
            return false;
        }
        self.replace(self.orientation.dragged(dx, dy, self.sensitivity))
    }

    /// applies a sensor sample in sensor mode, returns true when the orientation changed
    pub fn apply_sample(&mut self, sample: &OrientationSample) -> bool {
        if self.mode != OrientationMode::Sensor {
            return false;
        }
        self.replace(Orientation::from_sample(sample))
    }

    /// Switches to sensor mode. The camera and sensor listener are acquired
    /// first; if either fails the model stays in manual mode.
    pub fn enter_sensor_mode(&mut self, device: &mut DeviceLink) -> OrientationMode {
        if self.mode == OrientationMode::Sensor {
            return self.mode;
        }
        match device.activate() {
            Ok(()) => {
                self.mode = OrientationMode::Sensor;
                info!("entered sensor mode");
            }
            Err(e) => {
                self.mode = OrientationMode::Manual;
                warn!(error = %e, "sensor mode unavailable, staying in manual mode");
            }
        }
        self.mode
    }

    pub fn leave_sensor_mode(&mut self, device: &mut DeviceLink) -> OrientationMode {
        device.release();
        if self.mode == OrientationMode::Sensor {
            info!("left sensor mode");
        }
        self.mode = OrientationMode::Manual;
        self.mode
    }

    fn replace(&mut self, next: Orientation) -> bool {
        let changed = next != self.orientation;
        self.orientation = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::device::{fakes, SensorCapability};
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    fn point(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint { x, y }
    }

    /// smallest distance between two bearings
    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_drag_moves_view() {
        let mut model = OrientationModel::default();
        model.begin_drag(point(100.0, 100.0));
        assert!(model.drag_to(point(110.0, 95.0)));
        let o = model.orientation();
        assert_abs_diff_eq!(o.azimuth, 178.0, epsilon = 1e-9);
        assert_abs_diff_eq!(o.altitude, 44.0, epsilon = 1e-9);

        // deltas are measured from the previous pointer position, not the origin
        assert!(model.drag_to(point(120.0, 95.0)));
        assert_abs_diff_eq!(model.orientation().azimuth, 176.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.orientation().altitude, 44.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_update_outside_drag() {
        let mut model = OrientationModel::default();
        assert!(!model.drag_to(point(500.0, 500.0)));
        assert_eq!(model.orientation(), Orientation::default());

        model.begin_drag(point(0.0, 0.0));
        model.end_drag();
        assert!(!model.is_dragging());
        assert!(!model.drag_to(point(50.0, 50.0)));
        assert_eq!(model.orientation(), Orientation::default());
    }

    #[test]
    fn test_azimuth_wraps_back_after_full_turn() {
        let mut model = OrientationModel::new(Orientation::new(37.5, 30.0), DEFAULT_SENSITIVITY);
        model.begin_drag(point(0.0, 0.0));
        // 18 steps of 100px at 0.2 deg/px is exactly one turn
        for i in 1..=18 {
            model.drag_to(point(-100.0 * i as f64, 0.0));
            let az = model.orientation().azimuth;
            assert!((0.0..360.0).contains(&az), "azimuth {}", az);
        }
        assert!(angular_distance(model.orientation().azimuth, 37.5) < 1e-9);
        assert_abs_diff_eq!(model.orientation().altitude, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_altitude_is_pinned_at_limits() {
        let mut model = OrientationModel::default();
        model.begin_drag(point(0.0, 0.0));
        model.drag_to(point(0.0, 10_000.0));
        assert_eq!(model.orientation().altitude, 90.0);
        model.drag_to(point(0.0, -10_000.0));
        assert_eq!(model.orientation().altitude, 0.0);
        model.drag_to(point(0.0, -10_050.0));
        assert_eq!(model.orientation().altitude, 0.0);
    }

    #[test]
    fn test_sample_mapping() {
        let o = Orientation::from_sample(&OrientationSample::new(90.0, 45.0));
        assert_abs_diff_eq!(o.azimuth, 270.0, epsilon = 1e-12);
        assert_abs_diff_eq!(o.altitude, 45.0, epsilon = 1e-12);

        let o = Orientation::from_sample(&OrientationSample::new(0.0, -30.0));
        assert_eq!(o.azimuth, 0.0);
        assert_eq!(o.altitude, 0.0);

        let o = Orientation::from_sample(&OrientationSample::new(10.0, 170.0));
        assert_abs_diff_eq!(o.azimuth, 350.0, epsilon = 1e-12);
        assert_eq!(o.altitude, 90.0);

        let o = Orientation::from_sample(&OrientationSample {
            alpha: None,
            beta: Some(20.0),
        });
        assert_eq!(o.azimuth, 0.0);
        assert_eq!(o.altitude, 20.0);
    }

    #[test]
    fn test_sensor_mode_ignores_drag() {
        let (mut device, _) = fakes::link(false, SensorCapability::Active);
        let mut model = OrientationModel::default();
        assert_eq!(model.enter_sensor_mode(&mut device), OrientationMode::Sensor);

        model.begin_drag(point(0.0, 0.0));
        assert!(!model.drag_to(point(300.0, 300.0)));
        assert_eq!(model.orientation(), Orientation::default());

        assert!(model.apply_sample(&OrientationSample::new(90.0, 45.0)));
        assert_abs_diff_eq!(model.orientation().azimuth, 270.0, epsilon = 1e-12);

        // the drag anchor kept tracking, so the first manual move has no jump
        model.leave_sensor_mode(&mut device);
        assert!(model.drag_to(point(305.0, 300.0)));
        assert_abs_diff_eq!(model.orientation().azimuth, 269.0, epsilon = 1e-9);
    }

    #[test]
    fn test_camera_failure_falls_back_to_manual() {
        let (mut device, counters) = fakes::link(true, SensorCapability::Active);
        let mut model = OrientationModel::default();
        assert_eq!(model.enter_sensor_mode(&mut device), OrientationMode::Manual);
        assert_eq!(model.mode(), OrientationMode::Manual);

        // stale samples delivered after the failure change nothing
        assert!(!model.apply_sample(&OrientationSample::new(90.0, 45.0)));
        assert_eq!(model.orientation(), Orientation::default());
        assert!(counters.balanced());
    }

    #[test]
    fn test_deserialized_orientation_is_normalised() {
        let o: Orientation = serde_json::from_str(r#"{"azimuth": 725.0, "altitude": -10.0}"#).unwrap();
        assert_abs_diff_eq!(o.azimuth, 5.0, epsilon = 1e-12);
        assert_eq!(o.altitude, 0.0);

        // out of range values written by hand are fixed when they reach the model
        let model = OrientationModel::new(
            Orientation {
                azimuth: -90.0,
                altitude: 95.0,
            },
            DEFAULT_SENSITIVITY,
        );
        assert_eq!(model.orientation(), Orientation::new(270.0, 90.0));
    }

    #[test]
    fn test_manual_mode_ignores_samples() {
        let mut model = OrientationModel::default();
        assert!(!model.apply_sample(&OrientationSample::new(10.0, 10.0)));
        assert_eq!(model.orientation(), Orientation::default());
    }

    #[test]
    fn randomized_drag_stays_in_range() {
        let mut rng = rand::thread_rng();
        let mut model = OrientationModel::default();
        model.begin_drag(point(0.0, 0.0));
        let (mut x, mut y) = (0.0, 0.0);
        for _ in 0..5000 {
            x += rng.gen_range(-400.0..400.0);
            y += rng.gen_range(-400.0..400.0);
            model.drag_to(point(x, y));
            let o = model.orientation();
            assert!((0.0..360.0).contains(&o.azimuth), "{:?}", o);
            assert!((0.0..=90.0).contains(&o.altitude), "{:?}", o);
        }
    }
}
