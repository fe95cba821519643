//! Record filtering.
//!
//! A [`FilterState`] holds every filter a list view exposes. Each one is open
//! (a no-op) until it is given a value, and the active ones are ANDed.
//!
//! | Filter | Matches when |
//! |--------|--------------|
//! | `text` | name, address, diagnosis or register number contains it (case-insensitive), or the phone contains it verbatim |
//! | `diagnosis` | it is one of the comma-separated diagnosis tokens |
//! | `status` | the record's active flag agrees |
//! | `form_type` | the report's form type is exactly it |
//! | `start_date`/`end_date` | the record date falls in the inclusive day range |
//!
//! Records without a usable date are excluded whenever a date bound is set.

use crate::error::CareError;
use crate::model::Record;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl FromStr for StatusFilter {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            other => Err(CareError::InvalidInput(format!(
                "Unknown status '{}' (expected all, active or inactive)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub text: String,
    /// `None` means all diagnoses.
    pub diagnosis: Option<String>,
    pub status: StatusFilter,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub form_type: Option<String>,
}

impl FilterState {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// `"All"` and the empty string both clear the diagnosis filter.
    pub fn with_diagnosis(mut self, diagnosis: &str) -> Self {
        let diagnosis = diagnosis.trim();
        self.diagnosis = if diagnosis.is_empty() || diagnosis == "All" {
            None
        } else {
            Some(diagnosis.to_string())
        };
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// The empty string clears the form type filter.
    pub fn with_form_type(mut self, form_type: &str) -> Self {
        self.form_type = if form_type.is_empty() {
            None
        } else {
            Some(form_type.to_string())
        };
        self
    }

    pub fn is_open(&self) -> bool {
        self.text.is_empty()
            && self.diagnosis().is_none()
            && self.status == StatusFilter::All
            && !self.has_date_range()
            && self.form_type().is_none()
    }

    /// The diagnosis in effect; blank and `"All"` count as no filter.
    pub fn diagnosis(&self) -> Option<&str> {
        self.diagnosis
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && *d != "All")
    }

    /// The form type in effect; the empty string counts as no filter.
    pub fn form_type(&self) -> Option<&str> {
        self.form_type.as_deref().filter(|ft| !ft.is_empty())
    }

    pub fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_text(record)
            && self.matches_diagnosis(record)
            && self.matches_status(record)
            && self.matches_form_type(record)
            && self.matches_dates(record)
    }

    fn matches_text(&self, record: &Record) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        let folded = [
            record.name(),
            record.address(),
            record.diagnosis(),
            record.registernumber(),
        ];
        folded
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
            || record
                .phone()
                .is_some_and(|phone| phone.contains(self.text.as_str()))
    }

    fn matches_diagnosis(&self, record: &Record) -> bool {
        let Some(wanted) = self.diagnosis() else {
            return true;
        };
        record
            .diagnosis()
            .is_some_and(|raw| diagnosis_tokens(raw).any(|token| token == wanted))
    }

    fn matches_status(&self, record: &Record) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => record.is_active(),
            StatusFilter::Inactive => !record.is_active(),
        }
    }

    fn matches_form_type(&self, record: &Record) -> bool {
        match self.form_type() {
            None => true,
            Some(wanted) => record.form_type() == Some(wanted),
        }
    }

    fn matches_dates(&self, record: &Record) -> bool {
        if !self.has_date_range() {
            return true;
        }
        let Some(at) = record.resolved_time() else {
            return false;
        };
        let at = at.timestamp_millis();
        if let Some(start) = self.start_date {
            if at < start_of_day(start).timestamp_millis() {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if at > end_of_day(end).timestamp_millis() {
                return false;
            }
        }
        true
    }
}

/// Keeps the records that pass `filter`, in input order.
pub fn apply(records: &[Record], filter: &FilterState) -> Vec<Record> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

/// Splits a multi-value diagnosis field (`"COPD, CKD"`) into trimmed tokens.
pub fn diagnosis_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Every distinct diagnosis token in `records`, sorted.
pub fn diagnosis_options(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(Record::diagnosis)
        .flat_map(diagnosis_tokens)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// Last millisecond of `date` (23:59:59.999).
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}
