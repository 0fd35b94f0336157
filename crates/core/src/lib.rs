//! Core types for water-truck dispatch.

use serde::{Deserialize, Serialize};

pub type CustomerId = u64;
pub type Gallons = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("fill references unknown customer {customer_id}")]
    MalformedReference { customer_id: CustomerId },
    #[error("unknown customer {0}")]
    UnknownCustomer(CustomerId),
    #[error("customer id {0} is used by more than one customer")]
    DuplicateCustomer(CustomerId),
    #[error("invalid fill: {0}")]
    InvalidFill(String),
    #[error("history store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub mod customer;
pub mod fill;
pub mod schedule;

pub use customer::{Customer, CustomerEdit, NewCustomer};
pub use fill::{FillEvent, FillRecord};
pub use schedule::{ScheduleEntry, UnscheduledReason, UrgencyStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DispatchError::MalformedReference { customer_id: 42 };
        assert_eq!(err.to_string(), "fill references unknown customer 42");

        let err = DispatchError::StoreUnavailable("disk full".to_string());
        assert_eq!(err.to_string(), "history store unavailable: disk full");

        let err = DispatchError::DuplicateCustomer(3);
        assert_eq!(err.to_string(), "customer id 3 is used by more than one customer");
    }
}
