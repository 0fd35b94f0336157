//! Interval estimation and due-date prediction from fill history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wt_core::{FillEvent, Gallons};

pub mod due;
pub mod risk;
pub mod urgency;

pub use due::{predict_due, DuePrediction};
pub use risk::risk_score;
pub use urgency::classify;

/// Per-customer statistics derived from its fills.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FillStats {
    pub fill_count: usize,
    pub last_filled: Option<NaiveDate>,
    /// Median days between consecutive fills; needs two or more fills.
    pub interval_days: Option<f64>,
    /// Median gallons over fills with a recorded, non-zero volume.
    pub gallons_per_fill: Option<Gallons>,
}

/// An estimator turns a customer's fills into cadence and volume statistics.
///
/// Implementations must not depend on the order of `fills`.
pub trait IntervalEstimator: Send + Sync {
    fn estimate(&self, fills: &[FillEvent]) -> FillStats;
}

/// Median of inter-fill gaps and of metered volumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianIntervalEstimator;

impl IntervalEstimator for MedianIntervalEstimator {
    fn estimate(&self, fills: &[FillEvent]) -> FillStats {
        let gaps: Vec<f64> = fill_gaps(fills).into_iter().map(|d| d as f64).collect();
        let volumes: Vec<f64> = fills.iter().filter_map(FillEvent::metered_gallons).collect();
        FillStats {
            fill_count: fills.len(),
            last_filled: fills.iter().map(|f| f.filled_on).max(),
            interval_days: median(gaps),
            gallons_per_fill: median(volumes),
        }
    }
}

/// Day gaps between consecutive fills after sorting by date.
///
/// Same-day fills yield a zero gap, which is kept.
pub fn fill_gaps(fills: &[FillEvent]) -> Vec<i64> {
    let mut dates: Vec<NaiveDate> = fills.iter().map(|f| f.filled_on).collect();
    dates.sort_unstable();
    dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect()
}

/// Median; the mean of the middle pair for even lengths, `None` when empty.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
