use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Catalog identifier of a star. Unique within one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarId(pub u32);

impl fmt::Display for StarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: StarId,
    /// common name, e.g. "Sirius"
    pub name: String,
    pub constellation: String,
    /// right ascension in degrees, [0, 360)
    pub ra: f64,
    /// declination in degrees, [-90, 90]
    pub dec: f64,
    /// apparent visual magnitude, lower is brighter
    #[serde(rename = "mag")]
    pub magnitude: f64,
    pub color: Color,
}

impl Star {
    /// checks the ranges a catalog entry must satisfy, the first violation is returned
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !(self.ra.is_finite() && (0.0..360.0).contains(&self.ra)) {
            return Err(CatalogError::RightAscensionOutOfRange {
                id: self.id,
                ra: self.ra,
            });
        }
        if !(self.dec.is_finite() && (-90.0..=90.0).contains(&self.dec)) {
            return Err(CatalogError::DeclinationOutOfRange {
                id: self.id,
                dec: self.dec,
            });
        }
        if !self.magnitude.is_finite() {
            return Err(CatalogError::InvalidMagnitude {
                id: self.id,
                mag: self.magnitude,
            });
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName { id: self.id });
        }
        Ok(())
    }
}

/// An sRGB display color with straight alpha.
///
/// Catalog documents spell colors as `#RRGGBB`; draw primitives serialize them
/// back as `#RRGGBB` when opaque and as `rgba(r,g,b,a)` otherwise, which any
/// 2D vector surface understands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const CYAN: Color = Color::rgb(0, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// parses `#RRGGBB` or the short form `#RGB`
    pub fn from_hex(text: &str) -> Result<Color, String> {
        let digits = text
            .strip_prefix('#')
            .ok_or_else(|| format!("color {:?} does not start with '#'", text))?;
        let channel = |s: &str| {
            u8::from_str_radix(s, 16).map_err(|_| format!("color {:?} is not hexadecimal", text))
        };
        match digits.len() {
            6 => Ok(Color::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let r = channel(&digits[0..1])?;
                let g = channel(&digits[1..2])?;
                let b = channel(&digits[2..3])?;
                Ok(Color::rgb(r * 17, g * 17, b * 17))
            }
            _ => Err(format!("color {:?} must have 3 or 6 hex digits", text)),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(value.trim())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_string()
    }
}
