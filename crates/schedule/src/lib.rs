//! Dispatch schedule: ordered service list, CSV export and map projection.

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod export;
pub mod map;

pub use builder::{ScheduleBuilder, ScheduleReport};
pub use export::{to_csv, write_csv, CSV_HEADER};
pub use map::{MapMarker, MapView, DEFAULT_CENTER};

pub const MAX_GALLONS_PRECISION: u32 = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Decimal places kept on gallons needed; 0 rounds to whole gallons.
    pub gallons_precision: u32,
}

impl ScheduleConfig {
    /// Configured precision, capped at [`MAX_GALLONS_PRECISION`].
    pub fn precision(&self) -> u32 {
        self.gallons_precision.min(MAX_GALLONS_PRECISION)
    }

    pub fn round_gallons(&self, gallons: f64) -> f64 {
        let scale = 10f64.powi(self.precision() as i32);
        (gallons * scale).round() / scale
    }
}
