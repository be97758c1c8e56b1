//! Real-time star map: transforms a star catalog from equatorial to horizontal
//! coordinates for an observer and instant, tracks where the view is pointed
//! (pointer drag or device sensor) and projects the visible sky onto a 2D
//! surface with hit-testing for star selection.

pub mod catalog;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod logging;
pub mod orientation;
pub mod projection;
pub mod selection;
pub mod session;

pub use catalog::{Catalog, Star, StarId};
pub use config::SkyViewConfig;
pub use coordinates::{transform, transform_all, HorizontalPosition, ObserverPosition, SkySnapshot};
pub use error::{CatalogError, Result, SkyViewError};
pub use orientation::{Orientation, OrientationMode, OrientationModel, OrientationSample};
pub use projection::{render_frame, Frame, RenderSettings, ScreenPoint, Viewport};
pub use session::SkySession;
