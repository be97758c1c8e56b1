use thiserror::Error;

use crate::catalog::StarId;

pub type Result<T> = std::result::Result<T, SkyViewError>;

#[derive(Debug, Error)]
pub enum SkyViewError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid observer position: {0}")]
    InvalidObserver(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load-time validation failures of a star catalog. Any of these is fatal,
/// a catalog is either fully valid or not loaded at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("star {id}: right ascension {ra} is outside [0, 360)")]
    RightAscensionOutOfRange { id: StarId, ra: f64 },

    #[error("star {id}: declination {dec} is outside [-90, 90]")]
    DeclinationOutOfRange { id: StarId, dec: f64 },

    #[error("star {id}: magnitude {mag} is not a finite number")]
    InvalidMagnitude { id: StarId, mag: f64 },

    #[error("star {id}: name must not be empty")]
    EmptyName { id: StarId },

    #[error("star {0} appears more than once")]
    DuplicateId(StarId),

    #[error("constellation line references unknown star {0}")]
    UnknownLineEndpoint(StarId),

    #[error("catalog contains no stars")]
    Empty,
}
