use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Coordinates, CustomerId, Gallons};

/// Urgency of a customer's next delivery. Variant order is the dispatch
/// order: overdue first, unscheduled last.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyStatus {
    Overdue,
    DueToday,
    Upcoming,
    Unscheduled,
}

impl UrgencyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UrgencyStatus::Overdue => "OVERDUE",
            UrgencyStatus::DueToday => "DUE_TODAY",
            UrgencyStatus::Upcoming => "UPCOMING",
            UrgencyStatus::Unscheduled => "UNSCHEDULED",
        }
    }
}

impl fmt::Display for UrgencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Why a customer has no predicted due date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    /// Never serviced.
    NoHistory,
    /// Exactly one fill; no cadence yet.
    InsufficientHistory,
}

impl UnscheduledReason {
    pub fn label(&self) -> &'static str {
        match self {
            UnscheduledReason::NoHistory => "unscheduled - no history",
            UnscheduledReason::InsufficientHistory => "unscheduled - insufficient history",
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One row of the dispatch list. Derived on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub customer_id: CustomerId,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub status: UrgencyStatus,
    pub unscheduled_reason: Option<UnscheduledReason>,
    pub gallons_needed: Option<Gallons>,
    pub last_filled: Option<NaiveDate>,
    pub interval_days: Option<f64>,
    pub days_until_due: Option<i64>,
    pub risk_score: Option<f64>,
    pub coordinates: Option<Coordinates>,
}
