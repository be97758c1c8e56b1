//! Camera and orientation-sensor collaborators used by the sensor (AR) mode.
//!
//! Both are platform specific and permission gated, so the crate only sees them
//! through the traits below. Whatever they hand out (a camera stream, a sensor
//! subscription) is held by [`ArResources`] and released when it drops, so a
//! torn down or failed session never leaks a running camera.

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCapability {
    /// the platform has an orientation sensor and may deliver samples
    Active,
    /// a sensor exists but the user or platform refused access
    Unauthorized,
    Unavailable,
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("camera permission denied")]
    CameraDenied,
    #[error("no camera available")]
    CameraUnavailable,
    #[error("orientation sensor is not authorized")]
    SensorUnauthorized,
    #[error("orientation sensor is unavailable")]
    SensorUnavailable,
}

/// a live video source used as the AR background
pub trait CameraStream {
    /// stops every underlying track; the stream is unusable afterwards
    fn stop_all_tracks(&mut self);
}

pub trait CameraProvider {
    /// requests the rear-facing camera
    fn acquire(&mut self) -> Result<Box<dyn CameraStream>, DeviceError>;
}

/// registration of an orientation-sample listener
pub trait SensorSubscription {
    fn detach(&mut self);
}

pub trait OrientationSensor {
    fn capability(&self) -> SensorCapability;
    fn attach(&mut self) -> Result<Box<dyn SensorSubscription>, DeviceError>;
}

/// The resources held while sensor mode is active. Dropping releases both.
pub struct ArResources {
    camera: Box<dyn CameraStream>,
    subscription: Box<dyn SensorSubscription>,
}

impl Drop for ArResources {
    fn drop(&mut self) {
        self.subscription.detach();
        self.camera.stop_all_tracks();
        debug!("released camera stream and sensor listener");
    }
}

/// Owns the platform collaborators and, while sensor mode is on, the resources
/// acquired from them.
pub struct DeviceLink {
    camera: Box<dyn CameraProvider>,
    sensor: Box<dyn OrientationSensor>,
    active: Option<ArResources>,
}

impl DeviceLink {
    pub fn new(camera: Box<dyn CameraProvider>, sensor: Box<dyn OrientationSensor>) -> DeviceLink {
        DeviceLink {
            camera,
            sensor,
            active: None,
        }
    }

    /// a link for hosts with neither camera nor sensor, sensor mode always falls back
    pub fn unavailable() -> DeviceLink {
        DeviceLink::new(Box::new(UnavailableCamera), Box::new(UnavailableSensor))
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Acquires the camera and attaches the sensor listener. On any failure
    /// whatever was already acquired is released again before returning.
    pub fn activate(&mut self) -> Result<(), DeviceError> {
        if self.active.is_some() {
            return Ok(());
        }
        let mut camera = self.camera.acquire()?;
        let subscription = match self.sensor.capability() {
            SensorCapability::Active => self.sensor.attach(),
            SensorCapability::Unauthorized => Err(DeviceError::SensorUnauthorized),
            SensorCapability::Unavailable => Err(DeviceError::SensorUnavailable),
        };
        match subscription {
            Ok(subscription) => {
                self.active = Some(ArResources {
                    camera,
                    subscription,
                });
                info!("camera stream acquired, orientation listener attached");
                Ok(())
            }
            Err(e) => {
                camera.stop_all_tracks();
                Err(e)
            }
        }
    }

    pub fn release(&mut self) {
        // Drop of ArResources does the work
        self.active = None;
    }
}

pub struct UnavailableCamera;

impl CameraProvider for UnavailableCamera {
    fn acquire(&mut self) -> Result<Box<dyn CameraStream>, DeviceError> {
        Err(DeviceError::CameraUnavailable)
    }
}

pub struct UnavailableSensor;

impl OrientationSensor for UnavailableSensor {
    fn capability(&self) -> SensorCapability {
        SensorCapability::Unavailable
    }

    fn attach(&mut self) -> Result<Box<dyn SensorSubscription>, DeviceError> {
        Err(DeviceError::SensorUnavailable)
    }
}
