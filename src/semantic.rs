//! Known semantic places.
//!
//! The table is immutable and bound into a decryptor at construction time,
//! so decode calls stay free of shared mutable state.

use std::collections::HashMap;

use serde::Deserialize;

/// Coordinates of a named, geofenced place.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SemanticPlace {
    /// Degrees.
    pub latitude: f32,
    /// Degrees.
    pub longitude: f32,
}

/// A case-insensitive lookup table from place name to coordinates.
#[derive(Debug, Clone, Default)]
pub struct SemanticPlaces(HashMap<String, SemanticPlace>);

#[derive(Deserialize)]
struct PlacesDocument {
    locations: Vec<PlacesEntry>,
}

#[derive(Deserialize)]
struct PlacesEntry {
    names: Vec<String>,
    latitude: f32,
    longitude: f32,
}

impl SemanticPlaces {
    /// Parse the `{"locations": [{"names": [...], "latitude": ...,
    /// "longitude": ...}]}` document shape. Every alias in `names` resolves
    /// to the same coordinates.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let document: PlacesDocument = serde_json::from_str(json)?;

        let mut table = HashMap::new();
        for entry in document.locations {
            let place = SemanticPlace {
                latitude: entry.latitude,
                longitude: entry.longitude,
            };
            for name in entry.names {
                table.insert(name.to_lowercase(), place);
            }
        }

        Ok(Self(table))
    }

    /// Look up a place by name, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<SemanticPlace> {
        self.0.get(&name.to_lowercase()).copied()
    }

    /// Whether the table holds any places.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SemanticPlace)> for SemanticPlaces {
    fn from_iter<I: IntoIterator<Item = (String, SemanticPlace)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, place)| (name.to_lowercase(), place))
                .collect(),
        )
    }
}
