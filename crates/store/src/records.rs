//! Boundary between loosely typed input rows and the typed model.
//!
//! Rows arrive as strings (CLI arguments, pasted spreadsheets). They are
//! validated here, once, and anything malformed is rejected with a reason
//! instead of reaching the estimator.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use wt_core::{CustomerId, FillEvent, FillRecord, NewCustomer};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("line {line}: expected 2 or 3 fields, got {got}")]
    FieldCount { line: usize, got: usize },
    #[error("line {line}: invalid customer id {value:?}")]
    BadCustomerId { line: usize, value: String },
    #[error("line {line}: invalid date {value:?}, expected YYYY-MM-DD")]
    BadDate { line: usize, value: String },
    #[error("line {line}: invalid gallons {value:?}")]
    BadGallons { line: usize, value: String },
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("fill on {filled_on} references unknown customer {customer_id}")]
    MalformedReference { customer_id: CustomerId, filled_on: NaiveDate },
    #[error("customer {name:?} reuses id {customer_id}")]
    DuplicateCustomer { customer_id: CustomerId, name: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCustomerRecord {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

impl RawCustomerRecord {
    pub fn validate(self) -> Result<NewCustomer, RecordError> {
        let name = self.name.trim().to_string();
        let address = self.address.trim().to_string();
        if name.is_empty() {
            return Err(RecordError::MissingField("name"));
        }
        if address.is_empty() {
            return Err(RecordError::MissingField("address"));
        }
        Ok(NewCustomer {
            name,
            address,
            coordinates: None,
            phone: non_empty(self.phone),
            notes: non_empty(self.notes),
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// One `customer_id,date[,gallons]` row as read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFillRecord {
    pub line: usize,
    pub customer_id: String,
    pub filled_on: String,
    #[serde(default)]
    pub gallons: String,
}

impl RawFillRecord {
    pub fn validate(&self) -> Result<FillRecord, RecordError> {
        let line = self.line;
        let customer_id = self
            .customer_id
            .trim()
            .parse::<CustomerId>()
            .map_err(|_| RecordError::BadCustomerId { line, value: self.customer_id.clone() })?;
        let filled_on = parse_date(&self.filled_on)
            .ok_or_else(|| RecordError::BadDate { line, value: self.filled_on.clone() })?;
        let gallons = match self.gallons.trim() {
            "" => None,
            g => Some(g.parse::<f64>().map_err(|_| RecordError::BadGallons {
                line,
                value: self.gallons.clone(),
            })?),
        };
        let event = FillEvent::new(filled_on, gallons)
            .map_err(|_| RecordError::BadGallons { line, value: self.gallons.clone() })?;
        Ok(FillRecord { customer_id, event })
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Splits text into raw fill rows. Blank lines, `#` comments and a
/// `customer_id` header are skipped; rows with the wrong field count are
/// returned as errors.
pub fn split_fill_rows(text: &str) -> (Vec<RawFillRecord>, Vec<RecordError>) {
    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("customer_id") {
            continue;
        }
        let fields: Vec<&str> = trimmed.split(',').collect();
        let (customer_id, filled_on, gallons) = match fields.as_slice() {
            [id, date] => (*id, *date, ""),
            [id, date, gallons] => (*id, *date, *gallons),
            other => {
                errors.push(RecordError::FieldCount { line, got: other.len() });
                continue;
            }
        };
        rows.push(RawFillRecord {
            line,
            customer_id: customer_id.to_string(),
            filled_on: filled_on.to_string(),
            gallons: gallons.to_string(),
        });
    }
    (rows, errors)
}

/// Result of validating a batch of fill rows.
#[derive(Debug, Default)]
pub struct FillBatch {
    pub accepted: Vec<FillRecord>,
    pub rejected: Vec<RecordError>,
}

/// Validates every row and checks it against the known customers. One bad
/// row never rejects the others.
pub fn validate_fills(text: &str, known: &HashSet<CustomerId>) -> FillBatch {
    let (rows, errors) = split_fill_rows(text);
    let mut batch = FillBatch { accepted: Vec::new(), rejected: errors };
    for row in rows {
        match row.validate() {
            Ok(rec) if known.contains(&rec.customer_id) => batch.accepted.push(rec),
            Ok(rec) => batch.rejected.push(RecordError::MalformedReference {
                customer_id: rec.customer_id,
                filled_on: rec.event.filled_on,
            }),
            Err(err) => batch.rejected.push(err),
        }
    }
    for err in &batch.rejected {
        warn!(%err, "fill row rejected");
    }
    batch
}
