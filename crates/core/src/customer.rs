use serde::{Deserialize, Serialize};

use crate::{Coordinates, CustomerId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    /// Last geocoder result for `address`; `None` if unresolved.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Registration payload; the store assigns the id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl NewCustomer {
    pub fn into_customer(self, id: CustomerId) -> Customer {
        Customer {
            id,
            name: self.name,
            address: self.address,
            coordinates: self.coordinates,
            phone: self.phone,
            notes: self.notes,
        }
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// A new `address` clears any cached coordinates unless `coordinates` is
/// supplied alongside it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerEdit {
    pub name: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl CustomerEdit {
    pub fn changes_address(&self, current: &Customer) -> bool {
        self.address
            .as_deref()
            .is_some_and(|addr| addr != current.address)
    }

    pub fn apply(self, customer: &mut Customer) {
        if self.changes_address(customer) {
            customer.coordinates = None;
        }
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(address) = self.address {
            customer.address = address;
        }
        if let Some(coordinates) = self.coordinates {
            customer.coordinates = Some(coordinates);
        }
        if let Some(phone) = self.phone {
            customer.phone = Some(phone);
        }
        if let Some(notes) = self.notes {
            customer.notes = Some(notes);
        }
    }
}
