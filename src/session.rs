
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Star, StarId};
use crate::config::SkyViewConfig;
use crate::coordinates::{transform_all, ObserverPosition, SkySnapshot};
use crate::orientation::device::DeviceLink;
use crate::orientation::{Orientation, OrientationMode, OrientationModel, OrientationSample};
use crate::projection::{render_frame, Frame, RenderSettings, ScreenPoint, Viewport};
use crate::selection::{self, DescriptionService};

/// Decides when the periodic transform is due. Driven by the instants it is
/// handed rather than a wall clock, so callers and tests pick the timeline.
#[derive(Debug, Clone)]
pub struct RefreshTimer {
    interval: Duration,
    last_run: Option<DateTime<Utc>>,
    cancelled: bool,
}

impl RefreshTimer {
    pub fn new(interval: Duration) -> RefreshTimer {
        RefreshTimer {
            interval,
            last_run: None,
            cancelled: false,
        }
    }

    /// True when no run happened yet or `interval` has elapsed since the last
    /// one. An instant earlier than the last run also counts as due.
    pub fn is_due(&self, now: &DateTime<Utc>) -> bool {
        if self.cancelled {
            return false;
        }
        match self.last_run {
            None => true,
            Some(last) => match (*now - last).to_std() {
                Ok(elapsed) => elapsed >= self.interval,
                Err(_) => true,
            },
        }
    }

    pub fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// One interactive sky view.
///
/// Owns the view orientation, the latest transformed sky and the AR device
/// resources; only the catalog is shared. Two things trigger work: the refresh
/// tick re-runs the transform when an observer position is known, and any
/// change of orientation, sky or viewport drops the cached frame so the next
/// [`SkySession::frame`] call rebuilds it from scratch.
pub struct SkySession {
    catalog: Arc<Catalog>,
    settings: RenderSettings,
    timer: RefreshTimer,
    observer: Option<ObserverPosition>,
    snapshot: Option<SkySnapshot>,
    model: OrientationModel,
    device: DeviceLink,
    viewport: Viewport,
    frame: Option<Frame>,
    selected: Option<StarId>,
    closed: bool,
}

impl SkySession {
    pub fn new(
        catalog: Arc<Catalog>,
        config: &SkyViewConfig,
        device: DeviceLink,
        viewport: Viewport,
    ) -> SkySession {
        SkySession {
            catalog,
            settings: config.projection.clone(),
            timer: RefreshTimer::new(config.refresh_interval()),
            observer: None,
            snapshot: None,
            model: OrientationModel::new(config.initial_view, config.drag_sensitivity),
            device,
            viewport,
            frame: None,
            selected: None,
            closed: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn observer(&self) -> Option<&ObserverPosition> {
        self.observer.as_ref()
    }

    /// Records the observer position and transforms the sky for `now` right away.
    pub fn set_observer(&mut self, observer: ObserverPosition, now: DateTime<Utc>) {
        if self.closed {
            return;
        }
        info!(lat = observer.lat, lon = observer.lon, "observer position set");
        self.observer = Some(observer);
        self.recompute(now);
    }

    /// Periodic refresh. Does nothing until an observer position is known, and
    /// nothing after the session was closed. Returns true when the sky was
    /// recomputed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.closed || self.observer.is_none() || !self.timer.is_due(&now) {
            return false;
        }
        self.recompute(now);
        true
    }

    fn recompute(&mut self, now: DateTime<Utc>) {
        let Some(observer) = self.observer else {
            return;
        };
        let positions = transform_all(self.catalog.stars(), &observer, &now);
        debug!(
            stars = positions.len(),
            visible = positions.iter().filter(|p| p.visible).count(),
            instant = %now,
            "sky recomputed"
        );
        self.snapshot = Some(SkySnapshot {
            instant: now,
            observer,
            positions,
        });
        self.timer.mark_run(now);
        self.frame = None;
    }

    pub fn snapshot(&self) -> Option<&SkySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn orientation(&self) -> Orientation {
        self.model.orientation()
    }

    pub fn mode(&self) -> OrientationMode {
        self.model.mode()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.frame = None;
        }
    }

    pub fn pointer_down(&mut self, point: ScreenPoint) {
        if self.closed {
            return;
        }
        self.model.begin_drag(point);
    }

    /// returns true when the drag moved the view
    pub fn pointer_move(&mut self, point: ScreenPoint) -> bool {
        if self.closed {
            return false;
        }
        let changed = self.model.drag_to(point);
        if changed {
            self.frame = None;
        }
        changed
    }

    pub fn pointer_up(&mut self) {
        self.model.end_drag();
    }

    /// an orientation sample from the device sensor, ignored unless in sensor mode
    pub fn on_orientation_sample(&mut self, sample: &OrientationSample) -> bool {
        if self.closed {
            return false;
        }
        let changed = self.model.apply_sample(sample);
        if changed {
            self.frame = None;
        }
        changed
    }

    /// Tries to enter sensor mode, falling back to manual when the camera or
    /// sensor cannot be acquired. Returns the resulting mode.
    pub fn enter_sensor_mode(&mut self) -> OrientationMode {
        if self.closed {
            return self.model.mode();
        }
        self.model.enter_sensor_mode(&mut self.device)
    }

    pub fn leave_sensor_mode(&mut self) -> OrientationMode {
        self.model.leave_sensor_mode(&mut self.device)
    }

    /// The camera stream died while sensor mode was on, e.g. the permission was
    /// revoked. Drops back to manual mode and releases the sensor listener.
    pub fn camera_lost(&mut self) -> OrientationMode {
        if self.model.mode() == OrientationMode::Sensor {
            warn!("camera stream lost, falling back to manual mode");
        }
        self.model.leave_sensor_mode(&mut self.device)
    }

    /// the AR button: flips between the two modes
    pub fn toggle_sensor_mode(&mut self) -> OrientationMode {
        match self.model.mode() {
            OrientationMode::Manual => self.enter_sensor_mode(),
            OrientationMode::Sensor => self.leave_sensor_mode(),
        }
    }

    pub fn device_active(&self) -> bool {
        self.device.is_active()
    }

    /// the current frame, rebuilt when anything it depends on changed
    pub fn frame(&mut self) -> &Frame {
        let frame = match self.frame.take() {
            Some(frame) => frame,
            None => render_frame(
                &self.model.orientation(),
                &self.catalog,
                self.snapshot.as_ref(),
                &self.viewport,
                &self.settings,
            ),
        };
        self.frame.insert(frame)
    }

    /// Hit-tests the current frame and selects the star under `point`, if any.
    /// A miss leaves the previous selection alone.
    pub fn select_at(&mut self, point: ScreenPoint) -> Option<&Star> {
        let id = self.frame().hit_test(&point)?;
        self.selected = Some(id);
        self.catalog.get(id)
    }

    pub fn selected(&self) -> Option<&Star> {
        self.selected.and_then(|id| self.catalog.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// text for the detail panel of the selected star
    pub fn describe_selection(&self, service: &dyn DescriptionService) -> Option<String> {
        self.selected()
            .map(|star| selection::describe_star(service, star))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Tears the view down: cancels the refresh tick and releases the camera
    /// and sensor listener. Dropping the session releases them as well.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.timer.cancel();
        self.model.leave_sensor_mode(&mut self.device);
        self.model.end_drag();
        self.snapshot = None;
        self.frame = None;
        self.closed = true;
        info!("sky session closed");
    }
}
