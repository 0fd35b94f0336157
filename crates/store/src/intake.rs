//! Customer registration and edits, with fail-soft geocoding.

use chrono::NaiveDate;
use tracing::info;
use wt_core::{Customer, CustomerEdit, CustomerId, DispatchError, NewCustomer};

use crate::geocode::{resolve_or_none, Geocoder};
use crate::HistoryStore;

#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    pub customer: Customer,
    /// A lookup was attempted and produced nothing.
    pub geocode_failed: bool,
}

/// Stores a new customer, resolving its address unless coordinates were
/// supplied. A known last fill date is recorded as an unmetered fill.
pub fn register_customer(
    store: &dyn HistoryStore,
    geocoder: &dyn Geocoder,
    mut customer: NewCustomer,
    last_filled: Option<NaiveDate>,
) -> Result<IntakeOutcome, DispatchError> {
    let mut geocode_failed = false;
    if customer.coordinates.is_none() {
        customer.coordinates = resolve_or_none(geocoder, &customer.address);
        geocode_failed = customer.coordinates.is_none();
    }
    let customer = store.add_customer(customer)?;
    if let Some(filled_on) = last_filled {
        store.append_fill_event(customer.id, filled_on, None)?;
    }
    info!(id = customer.id, name = %customer.name, geocoded = !geocode_failed, ?last_filled, "customer registered");
    Ok(IntakeOutcome { customer, geocode_failed })
}

/// Applies an edit; a changed address is re-geocoded.
pub fn edit_customer(
    store: &dyn HistoryStore,
    geocoder: &dyn Geocoder,
    id: CustomerId,
    mut edit: CustomerEdit,
) -> Result<IntakeOutcome, DispatchError> {
    let current = store.customer(id)?.ok_or(DispatchError::UnknownCustomer(id))?;
    let mut geocode_failed = false;
    if edit.changes_address(&current) && edit.coordinates.is_none() {
        if let Some(address) = edit.address.as_deref() {
            edit.coordinates = resolve_or_none(geocoder, address);
            geocode_failed = edit.coordinates.is_none();
        }
    }
    let customer = store.update_customer(id, edit)?;
    info!(id, "customer updated");
    Ok(IntakeOutcome { customer, geocode_failed })
}
