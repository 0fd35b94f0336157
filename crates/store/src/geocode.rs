//! Address resolution. Always optional: a failed lookup means "no
//! coordinates", never a failed write.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;
use wt_core::Coordinates;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("no match for address {0:?}")]
    NotFound(String),
    #[error("geocoder unavailable: {0}")]
    Unavailable(String),
}

pub trait Geocoder: Send + Sync {
    fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// Used when no geocoder is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGeocoder;

impl Geocoder for NoopGeocoder {
    fn resolve(&self, _address: &str) -> Result<Coordinates, GeocodeError> {
        Err(GeocodeError::Unavailable("no geocoder configured".to_string()))
    }
}

/// Fixed address table, matched case- and whitespace-insensitively.
#[derive(Debug, Clone, Default)]
pub struct TableGeocoder {
    table: HashMap<String, Coordinates>,
}

impl TableGeocoder {
    pub fn new(entries: impl IntoIterator<Item = (String, Coordinates)>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(addr, coords)| (normalize(&addr), coords))
                .collect(),
        }
    }

    /// Loads a JSON object of `{"address": {"lat": .., "lon": ..}}`.
    pub fn from_json_file(path: &Path) -> Result<Self, GeocodeError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GeocodeError::Unavailable(format!("{}: {e}", path.display())))?;
        let entries: HashMap<String, Coordinates> = serde_json::from_str(&raw)
            .map_err(|e| GeocodeError::Unavailable(format!("{}: {e}", path.display())))?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Geocoder for TableGeocoder {
    fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        self.table
            .get(&normalize(address))
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
    }
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolves `address`, logging and swallowing any failure.
pub fn resolve_or_none(geocoder: &dyn Geocoder, address: &str) -> Option<Coordinates> {
    match geocoder.resolve(address) {
        Ok(coords) => Some(coords),
        Err(err) => {
            warn!(%err, "geocoding failed, storing address without coordinates");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableGeocoder {
        TableGeocoder::new([(
            "12 Old Mill Rd, Dripping Springs".to_string(),
            Coordinates { lat: 30.19, lon: -98.08 },
        )])
    }

    #[test]
    fn matches_loosely() {
        let coords = table().resolve("  12 old mill rd,   DRIPPING Springs ").unwrap();
        assert_eq!(coords.lat, 30.19);
    }

    #[test]
    fn failures_degrade_to_none() {
        assert_eq!(resolve_or_none(&table(), "nowhere"), None);
        assert_eq!(resolve_or_none(&NoopGeocoder, "12 Old Mill Rd, Dripping Springs"), None);
    }

    #[test]
    fn loads_table_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geo.json");
        std::fs::write(&path, r#"{"1 Ranch Rd": {"lat": 30.0, "lon": -97.0}}"#).unwrap();
        let geo = TableGeocoder::from_json_file(&path).unwrap();
        assert_eq!(geo.len(), 1);
        assert!(geo.resolve("1 ranch rd").is_ok());
        assert!(TableGeocoder::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
