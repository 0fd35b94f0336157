use chrono::NaiveDate;

const MIN_SCALE_DAYS: f64 = 3.0;

/// Logistic score in (0, 1) of how late a delivery is running.
///
/// 0.5 on the due date; the curve widens with the customer's cadence so a
/// day late matters more for a weekly customer than a monthly one.
pub fn risk_score(due: NaiveDate, today: NaiveDate, interval_days: f64) -> f64 {
    let days_over = (today - due).num_days() as f64;
    let scale = (interval_days / 6.0).max(MIN_SCALE_DAYS);
    1.0 / (1.0 + (-days_over / scale).exp())
}
