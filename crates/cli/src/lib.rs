//! Command implementations behind the `dispatch` binary.

use std::collections::HashSet;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use wt_core::{Coordinates, Customer, CustomerEdit, CustomerId, FillEvent, Gallons, UrgencyStatus};
use wt_runtime::metrics::{BuildTimer, MetricsRegistry};
use wt_schedule::{MapView, ScheduleBuilder, ScheduleReport, MAX_GALLONS_PRECISION};
use wt_store::intake::{edit_customer, register_customer};
use wt_store::records::{validate_fills, FillBatch};
use wt_store::{CachedStore, Geocoder, HistoryStore, RawCustomerRecord};

pub mod config;

pub use config::DispatchConfig;

pub struct App<S> {
    pub config: DispatchConfig,
    pub store: CachedStore<S>,
    pub geocoder: Box<dyn Geocoder>,
    pub metrics: MetricsRegistry,
}

impl<S: HistoryStore> App<S> {
    pub fn new(config: DispatchConfig, store: CachedStore<S>, geocoder: Box<dyn Geocoder>) -> Self {
        Self { config, store, geocoder, metrics: MetricsRegistry::default() }
    }

    pub fn add_customer(
        &self,
        raw: RawCustomerRecord,
        coordinates: Option<Coordinates>,
        last_filled: Option<NaiveDate>,
    ) -> Result<Customer> {
        let mut customer = raw.validate().context("invalid customer")?;
        customer.coordinates = coordinates;
        let outcome = register_customer(&self.store, self.geocoder.as_ref(), customer, last_filled)?;
        if last_filled.is_some() {
            self.metrics.inc_fills_recorded(1);
        }
        if outcome.geocode_failed {
            self.metrics.inc_geocode_failures(1);
        }
        Ok(outcome.customer)
    }

    pub fn edit_customer(&self, id: CustomerId, edit: CustomerEdit) -> Result<Customer> {
        let outcome = edit_customer(&self.store, self.geocoder.as_ref(), id, edit)?;
        if outcome.geocode_failed {
            self.metrics.inc_geocode_failures(1);
        }
        Ok(outcome.customer)
    }

    pub fn record_fill(&self, id: CustomerId, filled_on: NaiveDate, gallons: Option<Gallons>) -> Result<FillEvent> {
        let event = self
            .store
            .append_fill_event(id, filled_on, gallons)
            .with_context(|| format!("failed to record fill for customer {id}"))?;
        self.metrics.inc_fills_recorded(1);
        info!(customer_id = id, %filled_on, ?gallons, "fill recorded");
        Ok(event)
    }

    /// Appends every valid `customer_id,date[,gallons]` row; bad rows are
    /// returned, not fatal.
    pub fn import_fills(&self, text: &str) -> Result<FillBatch> {
        let known: HashSet<CustomerId> = self.store.list_customers()?.iter().map(|c| c.id).collect();
        let batch = validate_fills(text, &known);
        for rec in &batch.accepted {
            self.store
                .append_fill_event(rec.customer_id, rec.event.filled_on, rec.event.gallons)?;
        }
        self.metrics.inc_fills_recorded(batch.accepted.len() as u64);
        self.metrics.inc_rejected_records(batch.rejected.len() as u64);
        info!(accepted = batch.accepted.len(), rejected = batch.rejected.len(), "fills imported");
        Ok(batch)
    }

    pub fn schedule(&self, today: NaiveDate) -> Result<ScheduleReport> {
        let timer = BuildTimer::start();
        let builder = ScheduleBuilder::with_median(self.config.schedule.clone());
        let report = builder.build(&self.store, today).context("schedule build failed")?;
        for err in &report.rejected {
            warn!(%err, "excluded from schedule");
        }
        self.metrics.inc_schedule_builds(1);
        self.metrics.inc_entries_emitted(report.len() as u64);
        self.metrics.inc_overdue_entries(report.count(UrgencyStatus::Overdue) as u64);
        self.metrics.inc_rejected_records(report.rejected.len() as u64);
        info!(
            %today,
            entries = report.len(),
            overdue = report.count(UrgencyStatus::Overdue),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "schedule ready"
        );
        Ok(report)
    }

    pub fn map_view(&self) -> Result<MapView> {
        Ok(MapView::from_directory(&self.store.directory()?))
    }

    pub fn customers_table(&self) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{:>4}  {:<24} {:<32} {:<14} {:<10} {:>5}", "ID", "NAME", "ADDRESS", "PHONE", "LAST FILL", "FILLS");
        for (c, p) in self.store.directory()? {
            let _ = writeln!(
                out,
                "{:>4}  {:<24} {:<32} {:<14} {:<10} {:>5}",
                c.id,
                truncate(&c.name, 24),
                truncate(&c.address, 32),
                c.phone.as_deref().unwrap_or("-"),
                p.last_filled.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                p.fill_count
            );
        }
        Ok(out)
    }
}

/// Human-readable schedule for the terminal.
pub fn schedule_table(report: &ScheduleReport, gallons_precision: u32) -> String {
    let precision = gallons_precision.min(MAX_GALLONS_PRECISION) as usize;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:<12} {:<10} {:>5} {:>9} {:>5}  NOTE",
        "NAME", "STATUS", "DUE", "DAYS", "GALLONS", "RISK"
    );
    for e in report {
        let _ = writeln!(
            out,
            "{:<24} {:<12} {:<10} {:>5} {:>9} {:>5}  {}",
            truncate(&e.name, 24),
            e.status,
            e.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            e.days_until_due.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            e.gallons_needed
                .map(|g| format!("{g:.precision$}"))
                .unwrap_or_else(|| "-".into()),
            e.risk_score.map(|r| format!("{r:.2}")).unwrap_or_else(|| "-".into()),
            e.unscheduled_reason.map(|r| r.label()).unwrap_or("")
        );
    }
    if let Some(fleet) = report.fleet_median_interval {
        let _ = writeln!(out, "fleet median interval: {fleet:.1} days");
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}
