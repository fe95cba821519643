//! Record ordering.
//!
//! Sorting is stable: records with equal keys keep their input order.
//!
//! Names are compared with the Unicode Collation Algorithm on lowercased
//! text, so `Émile` sorts between `adam` and `Zed`.
//!
//! Two orderings have fixed rules for bad data:
//! - `registernumber`: records without a register number go last in *both*
//!   directions; only parsed keys are reversed by `Desc`.
//! - `submittedAt`: a missing or unparseable date counts as the latest
//!   possible date, so it goes last ascending and first descending.

use super::register::RegisterKey;
use crate::error::CareError;
use crate::model::Record;
use chrono::{DateTime, Utc};
use feruca::Collator;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    RegisterNumber,
    SubmittedAt,
}

impl SortField {
    /// Field name as used by the backend schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::RegisterNumber => "registernumber",
            SortField::SubmittedAt => "submittedAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "registernumber" | "register" | "reg" => Ok(SortField::RegisterNumber),
            "submittedat" | "submitted" | "date" => Ok(SortField::SubmittedAt),
            other => Err(CareError::InvalidInput(format!(
                "Unknown sort field '{}' (expected name, registernumber or submittedAt)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

pub fn compare(a: &Record, b: &Record, sort: &SortState) -> Ordering {
    match sort.field {
        SortField::Name => sort.direction.apply(collate_names(a, b)),
        SortField::RegisterNumber => {
            let ka = RegisterKey::parse(a.registernumber());
            let kb = RegisterKey::parse(b.registernumber());
            match (ka, kb) {
                (RegisterKey::Missing, RegisterKey::Missing) => Ordering::Equal,
                (RegisterKey::Missing, _) => Ordering::Greater,
                (_, RegisterKey::Missing) => Ordering::Less,
                _ => sort.direction.apply(ka.cmp(&kb)),
            }
        }
        SortField::SubmittedAt => sort.direction.apply(time_key(a).cmp(&time_key(b))),
    }
}

/// Sorts in place; stable.
pub fn sort(records: &mut [Record], sort: &SortState) {
    records.sort_by(|a, b| compare(a, b, sort));
}

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

// A missing name collates as the empty string.
fn collate_names(a: &Record, b: &Record) -> Ordering {
    let a = a.name().unwrap_or_default().to_lowercase();
    let b = b.name().unwrap_or_default().to_lowercase();
    COLLATOR.with(|collator| collator.borrow_mut().collate(a.as_str(), b.as_str()))
}

// (invalid, time): invalid dates order after every valid one.
fn time_key(record: &Record) -> (bool, Option<DateTime<Utc>>) {
    match record.resolved_time() {
        Some(t) => (false, Some(t)),
        None => (true, None),
    }
}
