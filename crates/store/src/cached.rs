use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::Serialize;
use wt_core::{Customer, CustomerEdit, CustomerId, DispatchError, FillEvent, Gallons, NewCustomer};

use crate::{HistorySnapshot, HistoryStore};

/// Values derived from a customer's fills. Never authoritative.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Projection {
    pub fill_count: usize,
    pub last_filled: Option<NaiveDate>,
}

impl Projection {
    pub fn from_fills(fills: &[FillEvent]) -> Self {
        Self {
            fill_count: fills.len(),
            last_filled: fills.iter().map(|f| f.filled_on).max(),
        }
    }
}

/// Read-through projection cache in front of a store.
///
/// Entries are dropped when the customer gets a new fill or an edit, so a
/// projection always matches what the inner store would compute.
pub struct CachedStore<S> {
    inner: S,
    projections: RwLock<HashMap<CustomerId, Projection>>,
}

impl<S: HistoryStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, projections: RwLock::new(HashMap::new()) }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn projection(&self, id: CustomerId) -> Result<Projection, DispatchError> {
        if let Some(hit) = self.cache_read()?.get(&id) {
            return Ok(*hit);
        }
        // Fill under the write lock so a concurrent invalidate cannot be
        // overtaken by a stale insert.
        let mut cache = self.cache_write()?;
        if let Some(hit) = cache.get(&id) {
            return Ok(*hit);
        }
        let projection = Projection::from_fills(&self.inner.list_fill_events(id)?);
        cache.insert(id, projection);
        Ok(projection)
    }

    /// Customers by name, each with its projection.
    pub fn directory(&self) -> Result<Vec<(Customer, Projection)>, DispatchError> {
        self.inner
            .list_customers()?
            .into_iter()
            .map(|c| {
                let p = self.projection(c.id)?;
                Ok((c, p))
            })
            .collect()
    }

    pub fn invalidate(&self, id: CustomerId) -> Result<(), DispatchError> {
        self.cache_write()?.remove(&id);
        Ok(())
    }

    pub fn cached_len(&self) -> usize {
        self.projections.read().map(|m| m.len()).unwrap_or(0)
    }

    fn cache_read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<CustomerId, Projection>>, DispatchError> {
        self.projections
            .read()
            .map_err(|_| DispatchError::StoreUnavailable("projection cache poisoned".to_string()))
    }

    fn cache_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<CustomerId, Projection>>, DispatchError> {
        self.projections
            .write()
            .map_err(|_| DispatchError::StoreUnavailable("projection cache poisoned".to_string()))
    }
}

impl<S: HistoryStore> HistoryStore for CachedStore<S> {
    fn list_customers(&self) -> Result<Vec<Customer>, DispatchError> {
        self.inner.list_customers()
    }

    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, DispatchError> {
        self.inner.customer(id)
    }

    fn list_fill_events(&self, customer_id: CustomerId) -> Result<Vec<FillEvent>, DispatchError> {
        self.inner.list_fill_events(customer_id)
    }

    fn append_fill_event(
        &self,
        customer_id: CustomerId,
        filled_on: NaiveDate,
        gallons: Option<Gallons>,
    ) -> Result<FillEvent, DispatchError> {
        let event = self.inner.append_fill_event(customer_id, filled_on, gallons)?;
        self.invalidate(customer_id)?;
        Ok(event)
    }

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DispatchError> {
        self.inner.add_customer(customer)
    }

    fn update_customer(&self, id: CustomerId, edit: CustomerEdit) -> Result<Customer, DispatchError> {
        let customer = self.inner.update_customer(id, edit)?;
        self.invalidate(id)?;
        Ok(customer)
    }

    fn snapshot(&self) -> Result<HistorySnapshot, DispatchError> {
        self.inner.snapshot()
    }
}
