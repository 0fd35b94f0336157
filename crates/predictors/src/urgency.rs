use std::cmp::Ordering;

use chrono::NaiveDate;
use wt_core::UrgencyStatus;

pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> UrgencyStatus {
    match due.map(|d| d.cmp(&today)) {
        Some(Ordering::Less) => UrgencyStatus::Overdue,
        Some(Ordering::Equal) => UrgencyStatus::DueToday,
        Some(Ordering::Greater) => UrgencyStatus::Upcoming,
        None => UrgencyStatus::Unscheduled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let yesterday = today.pred_opt().unwrap();
        let tomorrow = today.succ_opt().unwrap();
        assert_eq!(classify(Some(yesterday), today), UrgencyStatus::Overdue);
        assert_eq!(classify(Some(today), today), UrgencyStatus::DueToday);
        assert_eq!(classify(Some(tomorrow), today), UrgencyStatus::Upcoming);
        assert_eq!(classify(None, today), UrgencyStatus::Unscheduled);
    }

    #[test]
    fn earlier_due_never_sorts_after_later_due() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let dates: Vec<Option<NaiveDate>> = (-3..=3)
            .map(|n| Some(today + chrono::Duration::days(n)))
            .chain(std::iter::once(None))
            .collect();
        for pair in dates.windows(2) {
            assert!(classify(pair[0], today) <= classify(pair[1], today));
        }
    }
}
