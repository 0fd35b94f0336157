use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;
use wt_core::{Customer, CustomerEdit, CustomerId, DispatchError, FillEvent, Gallons, NewCustomer};

use crate::{HistorySnapshot, HistoryStore};

/// Process-local store; everything lives under a single lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<HistorySnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads existing contents. Customer ids must be unique; fill references
    /// are not checked here, the schedule build reports orphaned fills.
    pub fn from_snapshot(snapshot: HistorySnapshot) -> Result<Self, DispatchError> {
        snapshot.check_unique_ids()?;
        Ok(Self { state: RwLock::new(snapshot) })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HistorySnapshot>, DispatchError> {
        self.state
            .read()
            .map_err(|_| DispatchError::StoreUnavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HistorySnapshot>, DispatchError> {
        self.state
            .write()
            .map_err(|_| DispatchError::StoreUnavailable("store lock poisoned".to_string()))
    }
}

impl HistoryStore for InMemoryStore {
    fn list_customers(&self) -> Result<Vec<Customer>, DispatchError> {
        Ok(self.read()?.customers_by_name())
    }

    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, DispatchError> {
        Ok(self.read()?.customer(id).cloned())
    }

    fn list_fill_events(&self, customer_id: CustomerId) -> Result<Vec<FillEvent>, DispatchError> {
        Ok(self.read()?.fills_for(customer_id))
    }

    fn append_fill_event(
        &self,
        customer_id: CustomerId,
        filled_on: NaiveDate,
        gallons: Option<Gallons>,
    ) -> Result<FillEvent, DispatchError> {
        let event = self.write()?.append_fill(customer_id, filled_on, gallons)?;
        debug!(customer_id, %filled_on, ?gallons, "fill appended");
        Ok(event)
    }

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DispatchError> {
        self.write()?.add_customer(customer)
    }

    fn update_customer(&self, id: CustomerId, edit: CustomerEdit) -> Result<Customer, DispatchError> {
        self.write()?.update_customer(id, edit)
    }

    fn snapshot(&self) -> Result<HistorySnapshot, DispatchError> {
        Ok(self.read()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Datelike;

    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, n).unwrap()
    }

    #[test]
    fn read_after_write() {
        let store = InMemoryStore::new();
        let c = store
            .add_customer(NewCustomer { name: "Hilltop".into(), address: "1 Ridge".into(), ..NewCustomer::default() })
            .unwrap();
        store.append_fill_event(c.id, day(3), Some(900.0)).unwrap();
        store.append_fill_event(c.id, day(1), None).unwrap();

        let fills = store.list_fill_events(c.id).unwrap();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].filled_on, day(3));
        assert_eq!(store.snapshot().unwrap().fills.len(), 2);
    }

    #[test]
    fn customers_listed_by_name() {
        let store = InMemoryStore::new();
        for name in ["Zeller", "Abbott", "Moreno"] {
            store.add_customer(NewCustomer { name: name.into(), ..NewCustomer::default() }).unwrap();
        }
        let names: Vec<String> = store.list_customers().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Abbott", "Moreno", "Zeller"]);
    }

    #[test]
    fn from_snapshot_rejects_shared_ids() {
        let mut snap = HistorySnapshot::default();
        for name in ["A", "B"] {
            snap.customers.push(NewCustomer { name: name.into(), ..NewCustomer::default() }.into_customer(1));
        }
        assert!(matches!(InMemoryStore::from_snapshot(snap), Err(DispatchError::DuplicateCustomer(1))));
    }

    #[test]
    fn update_unknown_customer_fails() {
        let store = InMemoryStore::new();
        let err = store.update_customer(99, CustomerEdit::default()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCustomer(99)));
    }

    #[test]
    fn snapshots_never_see_partial_appends() {
        let store = Arc::new(InMemoryStore::new());
        let c = store.add_customer(NewCustomer { name: "Dry Creek".into(), ..NewCustomer::default() }).unwrap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 1..=28 {
                    store.append_fill_event(c.id, day(n), Some(n as f64 * 10.0)).unwrap();
                }
            })
        };
        for _ in 0..50 {
            let snap = store.snapshot().unwrap();
            for rec in &snap.fills {
                let n = rec.event.filled_on.day();
                assert_eq!(rec.event.gallons, Some(n as f64 * 10.0));
            }
        }
        writer.join().unwrap();
        assert_eq!(store.list_fill_events(c.id).unwrap().len(), 28);
    }
}
