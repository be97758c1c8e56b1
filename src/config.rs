use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};

use crate::coordinates::ObserverPosition;
use crate::error::{Result, SkyViewError};
use crate::orientation::{Orientation, DEFAULT_SENSITIVITY};
use crate::projection::RenderSettings;

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Settings of a sky view, usually read from a TOML file. Every field has a
/// default, so an empty document gives the stock behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyViewConfig {
    /// how often the catalog is re-transformed, seconds
    pub refresh_interval_secs: f64,
    /// view rotation per dragged pixel, degrees
    pub drag_sensitivity: f64,
    pub initial_view: Orientation,
    /// observer used when no position is supplied
    pub fallback_observer: ObserverPosition,
    pub projection: RenderSettings,
    /// alternative catalog document, the embedded bright-star list when unset
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for SkyViewConfig {
    fn default() -> Self {
        SkyViewConfig {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs_f64(),
            drag_sensitivity: DEFAULT_SENSITIVITY,
            initial_view: Orientation::default(),
            fallback_observer: ObserverPosition::FALLBACK,
            projection: RenderSettings::default(),
            catalog_path: None,
            log_level: String::from("info"),
        }
    }
}

impl SkyViewConfig {
    pub fn from_toml(text: &str) -> Result<SkyViewConfig> {
        let config: SkyViewConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<SkyViewConfig> {
        let text = std::fs::read_to_string(path)?;
        SkyViewConfig::from_toml(&text)
    }

    /// The refresh interval as a `Duration`. A value `validate` would reject
    /// falls back to the default interval.
    pub fn refresh_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.refresh_interval_secs)
            .ok()
            .filter(|interval| !interval.is_zero())
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SkyViewError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        }

        positive("refresh_interval_secs", self.refresh_interval_secs)?;
        Duration::try_from_secs_f64(self.refresh_interval_secs).map_err(|e| {
            SkyViewError::Config(format!(
                "refresh_interval_secs {} is not a usable interval: {}",
                self.refresh_interval_secs, e
            ))
        })?;
        positive("drag_sensitivity", self.drag_sensitivity)?;
        positive("projection.scale", self.projection.scale)?;
        positive("projection.hit_radius", self.projection.hit_radius)?;

        let clip = self.projection.clip_angle;
        if !(clip > 0.0 && clip < 180.0) {
            return Err(SkyViewError::Config(format!(
                "projection.clip_angle must lie in (0, 180), got {}",
                clip
            )));
        }
        let step = self.projection.graticule_step;
        if !(step > 0.0 && step <= 90.0) {
            return Err(SkyViewError::Config(format!(
                "projection.graticule_step must lie in (0, 90], got {}",
                step
            )));
        }
        // range check only, the constructor does the work
        ObserverPosition::new(self.fallback_observer.lat, self.fallback_observer.lon)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = SkyViewConfig::from_toml("").unwrap();
        assert_eq!(config, SkyViewConfig::default());
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.projection.hit_radius, 20.0);
        assert_eq!(config.initial_view, Orientation::new(180.0, 45.0));
    }

    #[test]
    fn test_partial_document() {
        let config = SkyViewConfig::from_toml(
            r#"
            refresh_interval_secs = 5
            drag_sensitivity = 0.5

            [initial_view]
            azimuth = 90.0
            altitude = 10.0

            [projection]
            scale = 600.0
            show_graticule = false
            "#,
        )
        .unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.drag_sensitivity, 0.5);
        assert_eq!(config.initial_view.azimuth, 90.0);
        assert_eq!(config.projection.scale, 600.0);
        assert!(!config.projection.show_graticule);
        // untouched fields keep their defaults
        assert_eq!(config.projection.label_magnitude_limit, 1.5);
        assert_eq!(config.fallback_observer, ObserverPosition::FALLBACK);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for doc in [
            "refresh_interval_secs = 0",
            "refresh_interval_secs = 1e20",
            "drag_sensitivity = -1.0",
            "[projection]\nclip_angle = 180.0",
            "[projection]\ngraticule_step = 0.0",
            "[fallback_observer]\nlat = 95.0\nlon = 0.0",
        ] {
            assert!(
                matches!(
                    SkyViewConfig::from_toml(doc),
                    Err(SkyViewError::Config(_)) | Err(SkyViewError::InvalidObserver(_))
                ),
                "{} should be rejected",
                doc
            );
        }
        assert!(matches!(
            SkyViewConfig::from_toml("refresh_interval_secs = \"soon\""),
            Err(SkyViewError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_unvalidated_interval_does_not_panic() {
        let config = SkyViewConfig {
            refresh_interval_secs: 1e20,
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        let config = SkyViewConfig {
            refresh_interval_secs: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_initial_view_is_normalised_on_load() {
        let config = SkyViewConfig::from_toml(
            "[initial_view]\nazimuth = -30.0\naltitude = 120.0",
        )
        .unwrap();
        assert_eq!(config.initial_view, Orientation::new(330.0, 90.0));
        assert_eq!(config.initial_view.altitude, 90.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        let config = SkyViewConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
    }
}
