use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CustomerId, DispatchError, Gallons};

/// One delivery. Appended, never edited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FillEvent {
    pub filled_on: NaiveDate,
    pub gallons: Option<Gallons>,
}

impl FillEvent {
    pub fn new(filled_on: NaiveDate, gallons: Option<Gallons>) -> Result<Self, DispatchError> {
        if let Some(g) = gallons {
            if !g.is_finite() || g < 0.0 {
                return Err(DispatchError::InvalidFill(format!(
                    "gallons must be a non-negative number, got {g}"
                )));
            }
        }
        Ok(Self { filled_on, gallons })
    }

    /// Gallons usable for volume statistics: recorded and non-zero.
    pub fn metered_gallons(&self) -> Option<Gallons> {
        self.gallons.filter(|g| *g > 0.0)
    }
}

/// A fill together with the customer it belongs to, as stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FillRecord {
    pub customer_id: CustomerId,
    #[serde(flatten)]
    pub event: FillEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn rejects_negative_gallons() {
        assert!(matches!(
            FillEvent::new(day(1), Some(-5.0)),
            Err(DispatchError::InvalidFill(_))
        ));
        assert!(FillEvent::new(day(1), Some(f64::NAN)).is_err());
    }

    #[test]
    fn zero_gallons_is_an_anchor_but_not_metered() {
        let fill = FillEvent::new(day(1), Some(0.0)).unwrap();
        assert_eq!(fill.metered_gallons(), None);
        let fill = FillEvent::new(day(1), None).unwrap();
        assert_eq!(fill.metered_gallons(), None);
        let fill = FillEvent::new(day(1), Some(2500.0)).unwrap();
        assert_eq!(fill.metered_gallons(), Some(2500.0));
    }

    #[test]
    fn record_serializes_flat() {
        let rec = FillRecord {
            customer_id: 3,
            event: FillEvent::new(day(2), Some(100.0)).unwrap(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"customer_id":3,"filled_on":"2024-03-02","gallons":100.0}"#
        );
    }
}
