//! History store: customers and their fill events.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wt_core::{
    Customer, CustomerEdit, CustomerId, DispatchError, FillEvent, FillRecord, Gallons, NewCustomer,
};

pub mod cached;
pub mod file;
pub mod geocode;
pub mod intake;
pub mod memory;
pub mod records;

pub use cached::{CachedStore, Projection};
pub use file::JsonFileStore;
pub use geocode::{GeocodeError, Geocoder, NoopGeocoder, TableGeocoder};
pub use memory::InMemoryStore;
pub use records::{RawCustomerRecord, RawFillRecord, RecordError};

/// Durable customer and fill history.
///
/// Writes are atomic: a concurrent `snapshot` sees a fill either fully
/// recorded or not at all, and every read after a successful write sees it.
pub trait HistoryStore: Send + Sync {
    /// All customers, ordered by name.
    fn list_customers(&self) -> Result<Vec<Customer>, DispatchError>;

    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, DispatchError>;

    /// Fills for one customer in insertion order.
    fn list_fill_events(&self, customer_id: CustomerId) -> Result<Vec<FillEvent>, DispatchError>;

    fn append_fill_event(
        &self,
        customer_id: CustomerId,
        filled_on: NaiveDate,
        gallons: Option<Gallons>,
    ) -> Result<FillEvent, DispatchError>;

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DispatchError>;

    fn update_customer(&self, id: CustomerId, edit: CustomerEdit) -> Result<Customer, DispatchError>;

    /// Customers and fills read together.
    ///
    /// The default joins the per-customer reads and is only as consistent as
    /// they are; stores holding everything under one lock override it.
    fn snapshot(&self) -> Result<HistorySnapshot, DispatchError> {
        let customers = self.list_customers()?;
        let mut fills = Vec::new();
        for customer in &customers {
            fills.extend(
                self.list_fill_events(customer.id)?
                    .into_iter()
                    .map(|event| FillRecord { customer_id: customer.id, event }),
            );
        }
        Ok(HistorySnapshot { customers, fills })
    }
}

/// Full store contents at one point in time. Also the on-disk document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistorySnapshot {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub fills: Vec<FillRecord>,
}

impl HistorySnapshot {
    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn fills_for(&self, id: CustomerId) -> Vec<FillEvent> {
        self.fills
            .iter()
            .filter(|r| r.customer_id == id)
            .map(|r| r.event)
            .collect()
    }

    pub fn customers_by_name(&self) -> Vec<Customer> {
        let mut customers = self.customers.clone();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        customers
    }

    /// Fails on the first id held by two customers.
    pub fn check_unique_ids(&self) -> Result<(), DispatchError> {
        let mut seen = HashSet::with_capacity(self.customers.len());
        match self.customers.iter().find(|c| !seen.insert(c.id)) {
            Some(dup) => Err(DispatchError::DuplicateCustomer(dup.id)),
            None => Ok(()),
        }
    }

    pub(crate) fn add_customer(&mut self, customer: NewCustomer) -> Result<Customer, DispatchError> {
        let id = self
            .customers
            .iter()
            .map(|c| c.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| DispatchError::StoreUnavailable("customer id space exhausted".to_string()))?;
        let customer = customer.into_customer(id);
        self.customers.push(customer.clone());
        Ok(customer)
    }

    pub(crate) fn update_customer(
        &mut self,
        id: CustomerId,
        edit: CustomerEdit,
    ) -> Result<Customer, DispatchError> {
        let customer = self
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DispatchError::UnknownCustomer(id))?;
        edit.apply(customer);
        Ok(customer.clone())
    }

    pub(crate) fn append_fill(
        &mut self,
        customer_id: CustomerId,
        filled_on: NaiveDate,
        gallons: Option<Gallons>,
    ) -> Result<FillEvent, DispatchError> {
        if self.customer(customer_id).is_none() {
            return Err(DispatchError::MalformedReference { customer_id });
        }
        let event = FillEvent::new(filled_on, gallons)?;
        self.fills.push(FillRecord { customer_id, event });
        Ok(event)
    }
}
