pub mod star;

use std::collections::HashMap;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
pub use star::{Color, Star, StarId};

/// the bright-star catalog shipped with the crate: the twenty brightest stars and Polaris
const BRIGHT_STARS_JSON: &str = include_str!("../data/bright_stars.json");

/// a segment of a constellation figure, drawn between two catalog stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstellationLine(pub StarId, pub StarId);

#[derive(Deserialize)]
struct CatalogDocument {
    stars: Vec<Star>,
    #[serde(default)]
    constellation_lines: Vec<ConstellationLine>,
}

/// An ordered, immutable list of stars.
///
/// Validation happens once, when the catalog is built; after that every entry
/// is known to be in range and consumers never re-check per frame. There is no
/// mutation API, sessions share one catalog behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalog {
    stars: Vec<Star>,
    index: HashMap<StarId, usize>,
    lines: Vec<ConstellationLine>,
}

impl Catalog {
    pub fn new(stars: Vec<Star>, lines: Vec<ConstellationLine>) -> Result<Catalog, CatalogError> {
        if stars.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut index = HashMap::with_capacity(stars.len());
        for (position, star) in stars.iter().enumerate() {
            star.validate()?;
            if index.insert(star.id, position).is_some() {
                return Err(CatalogError::DuplicateId(star.id));
            }
        }
        for line in &lines {
            for endpoint in [line.0, line.1] {
                if !index.contains_key(&endpoint) {
                    return Err(CatalogError::UnknownLineEndpoint(endpoint));
                }
            }
        }
        debug!(stars = stars.len(), lines = lines.len(), "catalog validated");
        Ok(Catalog { stars, index, lines })
    }

    /// the embedded bright-star catalog
    pub fn bright_stars() -> Result<Catalog, CatalogError> {
        Catalog::from_json(BRIGHT_STARS_JSON)
    }

    pub fn from_json(text: &str) -> Result<Catalog, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(text)?;
        Catalog::new(document.stars, document.constellation_lines)
    }

    pub fn from_file(path: &Path) -> crate::Result<Catalog> {
        let text = std::fs::read_to_string(path)?;
        Ok(Catalog::from_json(&text)?)
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn get(&self, id: StarId) -> Option<&Star> {
        self.index.get(&id).map(|&i| &self.stars[i])
    }

    pub fn constellation_lines(&self) -> &[ConstellationLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bright_stars_load() {
        let catalog = Catalog::bright_stars().unwrap();
        assert_eq!(catalog.len(), 21);
        assert_eq!(catalog.stars()[0].name, "Sirius");
        assert_eq!(catalog.get(StarId(99)).unwrap().name, "Polaris");
        assert_eq!(catalog.constellation_lines().len(), 5);
        assert!(catalog.get(StarId(21)).is_none());
    }

    #[test]
    fn test_catalog_keeps_document_order() {
        let catalog = Catalog::bright_stars().unwrap();
        let ids: Vec<u32> = catalog.stars().iter().map(|s| s.id.0).collect();
        let mut expected: Vec<u32> = (1..=20).collect();
        expected.push(99);
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let json = r##"{"stars": [
            {"id": 1, "name": "A", "constellation": "X", "ra": 10.0, "dec": 0.0, "mag": 1.0, "color": "#FFFFFF"},
            {"id": 1, "name": "B", "constellation": "X", "ra": 20.0, "dec": 0.0, "mag": 1.0, "color": "#FFFFFF"}
        ]}"##;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateId(StarId(1)))
        ));
    }

    #[test]
    fn test_out_of_range_entry_is_rejected() {
        let json = r##"{"stars": [
            {"id": 7, "name": "A", "constellation": "X", "ra": 400.0, "dec": 0.0, "mag": 1.0, "color": "#FFFFFF"}
        ]}"##;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::RightAscensionOutOfRange { id: StarId(7), .. })
        ));
    }

    #[test]
    fn test_bad_color_and_dangling_line_are_rejected() {
        let bad_color = r##"{"stars": [
            {"id": 1, "name": "A", "constellation": "X", "ra": 10.0, "dec": 0.0, "mag": 1.0, "color": "white"}
        ]}"##;
        assert!(matches!(
            Catalog::from_json(bad_color),
            Err(CatalogError::Malformed(_))
        ));

        let dangling = r##"{"stars": [
            {"id": 1, "name": "A", "constellation": "X", "ra": 10.0, "dec": 0.0, "mag": 1.0, "color": "#FFFFFF"}
        ], "constellation_lines": [[1, 2]]}"##;
        assert!(matches!(
            Catalog::from_json(dangling),
            Err(CatalogError::UnknownLineEndpoint(StarId(2)))
        ));

        assert!(matches!(
            Catalog::from_json(r#"{"stars": []}"#),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BRIGHT_STARS_JSON.as_bytes()).unwrap();
        let catalog = Catalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 21);

        let missing = Catalog::from_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(missing, Err(crate::SkyViewError::Io(_))));
    }
}
