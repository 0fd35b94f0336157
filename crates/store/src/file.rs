use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{debug, info};
use wt_core::{Customer, CustomerEdit, CustomerId, DispatchError, FillEvent, Gallons, NewCustomer};

use crate::{HistorySnapshot, HistoryStore};

/// Store persisted as one JSON document.
///
/// Each write is applied to a copy of the contents, flushed to a temporary
/// file and renamed over the document before the in-memory state changes, so
/// a failed write leaves both disk and memory untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<HistorySnapshot>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DispatchError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| unavailable(&path, e))?;
            let snapshot: HistorySnapshot = serde_json::from_str(&raw)?;
            snapshot.check_unique_ids()?;
            for rec in &snapshot.fills {
                FillEvent::new(rec.event.filled_on, rec.event.gallons)?;
            }
            info!(path = %path.display(), customers = snapshot.customers.len(), fills = snapshot.fills.len(), "history loaded");
            snapshot
        } else {
            debug!(path = %path.display(), "history file not found, starting empty");
            HistorySnapshot::default()
        };
        Ok(Self { path, state: RwLock::new(snapshot) })
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    fn commit<T>(
        &self,
        change: impl FnOnce(&mut HistorySnapshot) -> Result<T, DispatchError>,
    ) -> Result<T, DispatchError> {
        let mut guard = self.write()?;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    fn persist(&self, snapshot: &HistorySnapshot) -> Result<(), DispatchError> {
        let body = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;
        }
        fs::write(&tmp, body).map_err(|e| unavailable(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| unavailable(&self.path, e))?;
        Ok(())
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> DispatchError {
    DispatchError::StoreUnavailable(format!("{}: {err}", path.display()))
}

impl HistoryStore for JsonFileStore {
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
        self.commit(|snap| snap.append_fill(customer_id, filled_on, gallons))
    }

    fn add_customer(&self, customer: NewCustomer) -> Result<Customer, DispatchError> {
        self.commit(|snap| snap.add_customer(customer))
    }

    fn update_customer(&self, id: CustomerId, edit: CustomerEdit) -> Result<Customer, DispatchError> {
        self.commit(|snap| snap.update_customer(id, edit))
    }

    fn snapshot(&self) -> Result<HistorySnapshot, DispatchError> {
        Ok(self.read()?.clone())
    }
}
