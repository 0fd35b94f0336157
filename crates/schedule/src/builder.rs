use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use wt_core::{Customer, CustomerId, DispatchError, FillEvent, ScheduleEntry, UrgencyStatus};
use wt_predictors::{classify, fill_gaps, median, predict_due, risk_score, IntervalEstimator, MedianIntervalEstimator};
use wt_store::{HistorySnapshot, HistoryStore, RecordError};

use crate::ScheduleConfig;

/// One build's output. Recomputed per request, never cached.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScheduleReport {
    pub today: NaiveDate,
    pub entries: Vec<ScheduleEntry>,
    /// Fills naming no known customer, and customers whose id was already
    /// taken; neither appears in `entries`.
    #[serde(skip)]
    pub rejected: Vec<RecordError>,
    /// Median gap across every customer's history.
    pub fleet_median_interval: Option<f64>,
}

impl ScheduleReport {
    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, status: UrgencyStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn entry(&self, id: CustomerId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.customer_id == id)
    }
}

impl<'a> IntoIterator for &'a ScheduleReport {
    type Item = &'a ScheduleEntry;
    type IntoIter = std::slice::Iter<'a, ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub struct ScheduleBuilder {
    cfg: ScheduleConfig,
    estimator: Arc<dyn IntervalEstimator>,
}

impl ScheduleBuilder {
    pub fn new(cfg: ScheduleConfig, estimator: Arc<dyn IntervalEstimator>) -> Self {
        Self { cfg, estimator }
    }

    pub fn with_median(cfg: ScheduleConfig) -> Self {
        Self::new(cfg, Arc::new(MedianIntervalEstimator))
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.cfg
    }

    /// Reads one snapshot and orders every customer for dispatch.
    ///
    /// Store failures propagate; no partial schedule is returned.
    pub fn build(&self, store: &dyn HistoryStore, today: NaiveDate) -> Result<ScheduleReport, DispatchError> {
        let snapshot = store.snapshot()?;
        Ok(self.build_from_snapshot(&snapshot, today))
    }

    pub fn build_from_snapshot(&self, snapshot: &HistorySnapshot, today: NaiveDate) -> ScheduleReport {
        let mut histories: HashMap<CustomerId, Vec<FillEvent>> = HashMap::new();
        let mut customers = Vec::with_capacity(snapshot.customers.len());
        let mut rejected = Vec::new();
        for c in &snapshot.customers {
            if histories.insert(c.id, Vec::new()).is_some() {
                warn!(customer_id = c.id, name = %c.name, "customer id already taken, excluded");
                rejected.push(RecordError::DuplicateCustomer { customer_id: c.id, name: c.name.clone() });
            } else {
                customers.push(c);
            }
        }
        for rec in &snapshot.fills {
            match histories.get_mut(&rec.customer_id) {
                Some(fills) => fills.push(rec.event),
                None => {
                    warn!(customer_id = rec.customer_id, filled_on = %rec.event.filled_on, "fill references unknown customer, excluded");
                    rejected.push(RecordError::MalformedReference {
                        customer_id: rec.customer_id,
                        filled_on: rec.event.filled_on,
                    });
                }
            }
        }

        let mut entries: Vec<ScheduleEntry> = customers
            .into_iter()
            .map(|c| {
                let fills = histories.get(&c.id).map(Vec::as_slice).unwrap_or(&[]);
                self.entry(c, fills, today)
            })
            .collect();
        entries.sort_by(dispatch_order);

        let all_gaps: Vec<f64> = histories
            .values()
            .flat_map(|fills| fill_gaps(fills))
            .map(|d| d as f64)
            .collect();

        debug!(
            %today,
            entries = entries.len(),
            rejected = rejected.len(),
            "schedule built"
        );

        ScheduleReport {
            today,
            entries,
            rejected,
            fleet_median_interval: median(all_gaps),
        }
    }

    /// Derives one customer's row from its fills.
    pub fn entry(&self, customer: &Customer, fills: &[FillEvent], today: NaiveDate) -> ScheduleEntry {
        let stats = self.estimator.estimate(fills);
        let prediction = predict_due(stats.last_filled, stats.interval_days);
        let due_date = prediction.due_date();
        let risk = match (due_date, stats.interval_days) {
            (Some(due), Some(interval)) => Some(risk_score(due, today, interval)),
            _ => None,
        };
        ScheduleEntry {
            customer_id: customer.id,
            name: customer.name.clone(),
            due_date,
            status: classify(due_date, today),
            unscheduled_reason: prediction.reason(),
            gallons_needed: stats.gallons_per_fill.map(|g| self.cfg.round_gallons(g)),
            last_filled: stats.last_filled,
            interval_days: stats.interval_days,
            days_until_due: prediction.days_until(today),
            risk_score: risk,
            coordinates: customer.coordinates,
        }
    }
}

/// Urgency, then due date (undated last), then name, then id.
pub fn dispatch_order(a: &ScheduleEntry, b: &ScheduleEntry) -> Ordering {
    a.status
        .cmp(&b.status)
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.customer_id.cmp(&b.customer_id))
}
