use chrono::NaiveDate;
use serde::Serialize;
use wt_core::{Coordinates, Customer, CustomerId};
use wt_store::Projection;

/// Used when no customer has been geocoded yet.
pub const DEFAULT_CENTER: Coordinates = Coordinates { lat: 30.2672, lon: -97.7431 };

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapMarker {
    pub customer_id: CustomerId,
    pub name: String,
    pub address: String,
    pub position: Coordinates,
    pub last_filled: Option<NaiveDate>,
}

impl MapMarker {
    pub fn popup(&self) -> String {
        let last = self
            .last_filled
            .map(|d| d.to_string())
            .unwrap_or_else(|| "never".to_string());
        format!("{}\n{}\nLast filled: {}", self.name, self.address, last)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// Customers without coordinates are left off the map.
    pub fn from_directory(directory: &[(Customer, Projection)]) -> Self {
        let markers: Vec<MapMarker> = directory
            .iter()
            .filter_map(|(c, p)| {
                c.coordinates.map(|position| MapMarker {
                    customer_id: c.id,
                    name: c.name.clone(),
                    address: c.address.clone(),
                    position,
                    last_filled: p.last_filled,
                })
            })
            .collect();
        Self { center: center_of(&markers), markers }
    }
}

fn center_of(markers: &[MapMarker]) -> Coordinates {
    if markers.is_empty() {
        return DEFAULT_CENTER;
    }
    let n = markers.len() as f64;
    let (lat, lon) = markers
        .iter()
        .fold((0.0, 0.0), |(lat, lon), m| (lat + m.position.lat, lon + m.position.lon));
    Coordinates { lat: lat / n, lon: lon / n }
}
