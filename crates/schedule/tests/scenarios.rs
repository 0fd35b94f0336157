use chrono::NaiveDate;

use wt_core::{
    Customer, CustomerEdit, CustomerId, DispatchError, FillEvent, Gallons, NewCustomer,
    UnscheduledReason, UrgencyStatus,
};
use wt_schedule::{to_csv, ScheduleBuilder, ScheduleConfig};
use wt_store::intake::register_customer;
use wt_store::{HistoryStore, InMemoryStore, NoopGeocoder};

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(n)
}

fn add(store: &InMemoryStore, name: &str) -> CustomerId {
    store
        .add_customer(NewCustomer { name: name.into(), address: format!("{name} Rd"), ..NewCustomer::default() })
        .unwrap()
        .id
}

fn builder() -> ScheduleBuilder {
    ScheduleBuilder::with_median(ScheduleConfig::default())
}

#[test]
fn scenario_a_due_today() {
    let store = InMemoryStore::new();
    let id = add(&store, "Alpha");
    store.append_fill_event(id, day(0), Some(100.0)).unwrap();
    store.append_fill_event(id, day(10), Some(100.0)).unwrap();

    let report = builder().build(&store, day(20)).unwrap();
    let e = report.entry(id).unwrap();
    assert_eq!(e.interval_days, Some(10.0));
    assert_eq!(e.due_date, Some(day(20)));
    assert_eq!(e.status, UrgencyStatus::DueToday);
    assert_eq!(e.gallons_needed, Some(100.0));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entries"][0]["status"], "DUE_TODAY");
    assert_eq!(json["entries"][0]["due_date"], "2024-01-21");
}

#[test]
fn scenario_b_overdue() {
    let store = InMemoryStore::new();
    let id = add(&store, "Bravo");
    for n in [30, 0, 10] {
        store.append_fill_event(id, day(n), None).unwrap();
    }

    let report = builder().build(&store, day(50)).unwrap();
    let e = report.entry(id).unwrap();
    assert_eq!(e.interval_days, Some(15.0));
    assert_eq!(e.last_filled, Some(day(30)));
    assert_eq!(e.due_date, Some(day(45)));
    assert_eq!(e.status, UrgencyStatus::Overdue);
    assert_eq!(e.days_until_due, Some(-5));
    assert_eq!(e.gallons_needed, None);
}

#[test]
fn half_day_median_rounds_to_even_day() {
    let store = InMemoryStore::new();
    let id = add(&store, "Echo");
    for n in [0, 10, 25] {
        store.append_fill_event(id, day(n), None).unwrap();
    }

    let report = builder().build(&store, day(37)).unwrap();
    let e = report.entry(id).unwrap();
    assert_eq!(e.interval_days, Some(12.5));
    assert_eq!(e.due_date, Some(day(37)));
    assert_eq!(e.status, UrgencyStatus::DueToday);
}

#[test]
fn scenario_c_single_fill_sorts_after_scheduled() {
    let store = InMemoryStore::new();
    let single = add(&store, "Aardvark");
    store.append_fill_event(single, day(5), Some(700.0)).unwrap();
    let regular = add(&store, "Zulu");
    store.append_fill_event(regular, day(0), None).unwrap();
    store.append_fill_event(regular, day(90), None).unwrap();

    let report = builder().build(&store, day(10)).unwrap();
    assert_eq!(report.entries[0].customer_id, regular);
    let last = report.entries.last().unwrap();
    assert_eq!(last.customer_id, single);
    assert_eq!(last.due_date, None);
    assert_eq!(last.status, UrgencyStatus::Unscheduled);
    assert_eq!(last.unscheduled_reason, Some(UnscheduledReason::InsufficientHistory));
}

#[test]
fn scenario_d_no_history_still_listed() {
    let store = InMemoryStore::new();
    let id = add(&store, "Delta");

    let report = builder().build(&store, day(0)).unwrap();
    assert_eq!(report.len(), 1);
    let e = report.entry(id).unwrap();
    assert_eq!(e.name, "Delta");
    assert_eq!(e.status, UrgencyStatus::Unscheduled);
    assert_eq!(e.unscheduled_reason, Some(UnscheduledReason::NoHistory));
    assert_eq!(e.gallons_needed, None);
    assert_eq!(to_csv(&report, 0).lines().nth(1), Some("1,Delta,,UNSCHEDULED,"));
}

#[test]
fn registered_last_fill_is_insufficient_history() {
    let store = InMemoryStore::new();
    let customer = NewCustomer { name: "Foxtrot".into(), address: "9 Fox Rd".into(), ..NewCustomer::default() };
    let id = register_customer(&store, &NoopGeocoder, customer, Some(day(3))).unwrap().customer.id;

    let report = builder().build(&store, day(10)).unwrap();
    let e = report.entry(id).unwrap();
    assert_eq!(e.last_filled, Some(day(3)));
    assert_eq!(e.status, UrgencyStatus::Unscheduled);
    assert_eq!(e.unscheduled_reason, Some(UnscheduledReason::InsufficientHistory));
}

#[test]
fn full_ordering_across_statuses() {
    let store = InMemoryStore::new();
    let upcoming = add(&store, "Upcoming");
    let never = add(&store, "Never");
    let overdue = add(&store, "Overdue");
    let today_due = add(&store, "Today");

    for (id, first, second) in [(upcoming, 0, 30), (overdue, 0, 5), (today_due, 0, 10)] {
        store.append_fill_event(id, day(first), Some(200.0)).unwrap();
        store.append_fill_event(id, day(second), Some(200.0)).unwrap();
    }

    let report = builder().build(&store, day(20)).unwrap();
    let order: Vec<CustomerId> = report.iter().map(|e| e.customer_id).collect();
    assert_eq!(order, vec![overdue, today_due, upcoming, never]);
    assert_eq!(report.count(UrgencyStatus::Overdue), 1);
}

#[test]
fn rebuilding_is_idempotent_and_sees_new_fills() {
    let store = InMemoryStore::new();
    let a = add(&store, "A");
    let b = add(&store, "B");
    store.append_fill_event(a, day(0), Some(300.0)).unwrap();
    store.append_fill_event(a, day(14), Some(320.0)).unwrap();
    store.append_fill_event(b, day(3), None).unwrap();

    let b1 = builder();
    let first = b1.build(&store, day(20)).unwrap();
    let second = b1.build(&store, day(20)).unwrap();
    assert_eq!(first, second);

    store.append_fill_event(b, day(6), None).unwrap();
    let third = b1.build(&store, day(20)).unwrap();
    assert_ne!(first, third);
    assert_eq!(third.entry(b).unwrap().due_date, Some(day(9)));
}

#[test]
fn gallons_follow_display_precision() {
    let store = InMemoryStore::new();
    let id = add(&store, "Precise");
    store.append_fill_event(id, day(0), Some(100.25)).unwrap();
    store.append_fill_event(id, day(7), Some(100.5)).unwrap();

    let whole = builder().build(&store, day(1)).unwrap();
    assert_eq!(whole.entry(id).unwrap().gallons_needed, Some(100.0));

    let cfg = ScheduleConfig { gallons_precision: 2 };
    let fine = ScheduleBuilder::with_median(cfg).build(&store, day(1)).unwrap();
    assert_eq!(fine.entry(id).unwrap().gallons_needed, Some(100.38));
}

struct DownStore;

impl HistoryStore for DownStore {
    fn list_customers(&self) -> Result<Vec<Customer>, DispatchError> {
        Err(DispatchError::StoreUnavailable("connection refused".into()))
    }

    fn customer(&self, _id: CustomerId) -> Result<Option<Customer>, DispatchError> {
        Err(DispatchError::StoreUnavailable("connection refused".into()))
    }

    fn list_fill_events(&self, _id: CustomerId) -> Result<Vec<FillEvent>, DispatchError> {
        Err(DispatchError::StoreUnavailable("connection refused".into()))
    }

    fn append_fill_event(
        &self,
        _id: CustomerId,
        _filled_on: NaiveDate,
        _gallons: Option<Gallons>,
    ) -> Result<FillEvent, DispatchError> {
        Err(DispatchError::StoreUnavailable("connection refused".into()))
    }

    fn add_customer(&self, _customer: NewCustomer) -> Result<Customer, DispatchError> {
        Err(DispatchError::StoreUnavailable("connection refused".into()))
    }

    fn update_customer(&self, _id: CustomerId, _edit: CustomerEdit) -> Result<Customer, DispatchError> {
        Err(DispatchError::StoreUnavailable("connection refused".into()))
    }
}

#[test]
fn store_failure_propagates() {
    let err = builder().build(&DownStore, day(0)).unwrap_err();
    assert!(matches!(err, DispatchError::StoreUnavailable(_)));
}
