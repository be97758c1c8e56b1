use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::graticule;
use super::{ScreenPoint, StereographicProjection, Viewport};
use crate::catalog::{Catalog, Color, StarId};
use crate::coordinates::{wrap_degrees, SkySnapshot};
use crate::orientation::Orientation;

const CARDINAL_DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

const GLOW_OPACITY: f64 = 0.8;
const GLOW_BLUR: f64 = 1.0;
const LABEL_FONT_SIZE: f64 = 10.0;
const COMPASS_FONT_SIZE: f64 = 14.0;
const GRATICULE_STROKE: Color = Color::rgba(255, 255, 255, 0.05);
const CONSTELLATION_STROKE: Color = Color::rgba(255, 255, 255, 0.2);
const LABEL_FILL: Color = Color::rgba(255, 255, 255, 0.7);

/// Tunables of the projection and the frame layout, all lengths in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// pixels per unit of the stereographic plane
    pub scale: f64,
    /// angular radius around the view centre that is drawn, degrees
    pub clip_angle: f64,
    pub hit_radius: f64,
    /// stars brighter than this (numerically lower) get a name label
    pub label_magnitude_limit: f64,
    pub label_offset: f64,
    /// distance of the compass readout above the bottom edge
    pub compass_offset: f64,
    pub graticule_step: f64,
    pub show_graticule: bool,
    pub show_constellation_lines: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            scale: 800.0,
            clip_angle: 90.0,
            hit_radius: 20.0,
            label_magnitude_limit: 1.5,
            label_offset: 15.0,
            compass_offset: 100.0,
            graticule_step: 15.0,
            show_graticule: true,
            show_constellation_lines: true,
        }
    }
}

/// horizontal alignment of a text primitive around its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Middle,
}

/// what a 2D surface has to draw, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Primitive {
    Circle {
        center: ScreenPoint,
        radius: f64,
        fill: Color,
        opacity: f64,
        blur: f64,
    },
    Text {
        position: ScreenPoint,
        content: String,
        anchor: TextAnchor,
        fill: Color,
        font_size: f64,
        bold: bool,
    },
    Line {
        from: ScreenPoint,
        to: ScreenPoint,
        stroke: Color,
        width: f64,
    },
    Polyline {
        points: Vec<ScreenPoint>,
        stroke: Color,
        width: f64,
    },
}

/// a star that made it onto the screen this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedStar {
    pub star_id: StarId,
    pub point: ScreenPoint,
    pub radius: f64,
    pub opacity: f64,
    pub labeled: bool,
}

/// invisible circle used only for pointer hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitTarget {
    pub star_id: StarId,
    pub center: ScreenPoint,
    pub radius: f64,
}

impl HitTarget {
    pub fn contains(&self, point: &ScreenPoint) -> bool {
        self.center.distance(point) <= self.radius
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compass {
    /// view azimuth rounded to the nearest degree
    pub degrees: i64,
    pub direction: String,
}

impl Compass {
    pub fn text(&self) -> String {
        format!("{}° {}", self.degrees, self.direction)
    }
}

/// One fully recomputed view: draw primitives in paint order plus the data
/// needed to hit-test them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub viewport: Viewport,
    pub orientation: Orientation,
    pub primitives: Vec<Primitive>,
    /// rendered stars in paint order
    pub stars: Vec<ProjectedStar>,
    /// hit circles in paint order, the last one is on top
    pub hit_targets: Vec<HitTarget>,
    pub compass: Compass,
}

impl Frame {
    /// The star whose hit circle contains `point`. Where circles overlap the
    /// topmost one, painted last, wins.
    pub fn hit_test(&self, point: &ScreenPoint) -> Option<StarId> {
        self.hit_targets
            .iter()
            .rev()
            .find(|target| target.contains(point))
            .map(|target| target.star_id)
    }

    pub fn projected(&self, id: StarId) -> Option<&ProjectedStar> {
        self.stars.iter().find(|s| s.star_id == id)
    }
}

/// one of N, NE, .., NW for a bearing in degrees, each label covers a 45 degree sector
pub fn cardinal_direction(azimuth: f64) -> &'static str {
    let sector = (wrap_degrees(azimuth) / 45.0).round() as usize % CARDINAL_DIRECTIONS.len();
    CARDINAL_DIRECTIONS[sector]
}

/// drawn radius of a star's glow, brighter stars are larger
pub fn glow_radius(magnitude: f64) -> f64 {
    (6.0 - magnitude * 1.5).max(2.0)
}

/// Builds a frame from scratch.
///
/// A star is drawn when it is above the horizon and the projection maps it,
/// i.e. it lies within the clip angle of the view direction. Without a
/// snapshot (observer position still unknown) only the grid and compass are
/// drawn.
pub fn render_frame(
    orientation: &Orientation,
    catalog: &Catalog,
    snapshot: Option<&SkySnapshot>,
    viewport: &Viewport,
    settings: &RenderSettings,
) -> Frame {
    let projection =
        StereographicProjection::new(orientation, viewport, settings.scale, settings.clip_angle);
    let mut primitives = vec![];

    if settings.show_graticule {
        let lines = graticule::grid_lines(settings.graticule_step);
        for points in graticule::project_lines(&projection, &lines) {
            primitives.push(Primitive::Polyline {
                points,
                stroke: GRATICULE_STROKE,
                width: 1.0,
            });
        }
    }

    let mut stars = vec![];
    for position in snapshot.into_iter().flat_map(SkySnapshot::visible) {
        let Some(star) = catalog.get(position.star_id) else {
            warn!(star = %position.star_id, "position for a star missing from the catalog");
            continue;
        };
        let Some(point) = projection.project(position.azimuth, position.altitude) else {
            continue;
        };
        stars.push(ProjectedStar {
            star_id: star.id,
            point,
            radius: glow_radius(star.magnitude),
            opacity: GLOW_OPACITY,
            labeled: star.magnitude < settings.label_magnitude_limit,
        });
    }

    if settings.show_constellation_lines {
        let placed: HashMap<StarId, ScreenPoint> =
            stars.iter().map(|s| (s.star_id, s.point)).collect();
        for line in catalog.constellation_lines() {
            if let (Some(&from), Some(&to)) = (placed.get(&line.0), placed.get(&line.1)) {
                primitives.push(Primitive::Line {
                    from,
                    to,
                    stroke: CONSTELLATION_STROKE,
                    width: 1.0,
                });
            }
        }
    }

    let mut hit_targets = Vec::with_capacity(stars.len());
    for projected in &stars {
        let Some(star) = catalog.get(projected.star_id) else {
            continue;
        };
        primitives.push(Primitive::Circle {
            center: projected.point,
            radius: projected.radius,
            fill: star.color,
            opacity: projected.opacity,
            blur: GLOW_BLUR,
        });
        hit_targets.push(HitTarget {
            star_id: star.id,
            center: projected.point,
            radius: settings.hit_radius,
        });
        if projected.labeled {
            primitives.push(Primitive::Text {
                position: ScreenPoint::new(
                    projected.point.x,
                    projected.point.y + settings.label_offset,
                ),
                content: star.name.clone(),
                anchor: TextAnchor::Middle,
                fill: LABEL_FILL,
                font_size: LABEL_FONT_SIZE,
                bold: false,
            });
        }
    }

    let compass = Compass {
        degrees: orientation.azimuth.round() as i64,
        direction: cardinal_direction(orientation.azimuth).to_string(),
    };
    primitives.push(Primitive::Text {
        position: ScreenPoint::new(
            viewport.width / 2.0,
            viewport.height - settings.compass_offset,
        ),
        content: compass.text(),
        anchor: TextAnchor::Middle,
        fill: Color::CYAN,
        font_size: COMPASS_FONT_SIZE,
        bold: true,
    });

    debug!(
        stars = stars.len(),
        primitives = primitives.len(),
        azimuth = orientation.azimuth,
        altitude = orientation.altitude,
        "frame rendered"
    );

    Frame {
        viewport: *viewport,
        orientation: *orientation,
        primitives,
        stars,
        hit_targets,
        compass,
    }
}
