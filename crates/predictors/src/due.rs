use chrono::{Days, NaiveDate};
use wt_core::UnscheduledReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuePrediction {
    Due(NaiveDate),
    Unscheduled(UnscheduledReason),
}

impl DuePrediction {
    pub fn due_date(&self) -> Option<NaiveDate> {
        match self {
            DuePrediction::Due(date) => Some(*date),
            DuePrediction::Unscheduled(_) => None,
        }
    }

    pub fn reason(&self) -> Option<UnscheduledReason> {
        match self {
            DuePrediction::Due(_) => None,
            DuePrediction::Unscheduled(reason) => Some(*reason),
        }
    }

    /// Signed days from `today` to the due date; negative when overdue.
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        self.due_date().map(|due| (due - today).num_days())
    }
}

/// Next due date: last fill plus the interval rounded to whole days,
/// half-day ties going to the even day.
pub fn predict_due(last_filled: Option<NaiveDate>, interval_days: Option<f64>) -> DuePrediction {
    let Some(last) = last_filled else {
        return DuePrediction::Unscheduled(UnscheduledReason::NoHistory);
    };
    let Some(interval) = interval_days else {
        return DuePrediction::Unscheduled(UnscheduledReason::InsufficientHistory);
    };
    let days = interval.max(0.0).round_ties_even() as u64;
    DuePrediction::Due(last.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX))
}
