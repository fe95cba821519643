use super::RecordStore;
use crate::error::{CareError, Result};
use crate::model::{Collection, Record};
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory record store for testing.
///
/// Keeps insertion order per collection and counts delete calls so tests can
/// assert exactly how often the backend was hit.
#[derive(Default)]
pub struct InMemoryStore {
    records: HashMap<Collection, Vec<Record>>,
    simulate_fetch_error: bool,
    simulate_delete_error: bool,
    delete_calls: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, giving it a fresh id if it has none. Returns the id.
    pub fn insert(&mut self, mut record: Record) -> String {
        if record.id().is_empty() {
            let id = Uuid::new_v4().simple().to_string();
            match &mut record {
                Record::Report(r) => r.id = id,
                Record::Patient(p) => p.id = id,
            }
        }
        let id = record.id().to_string();
        self.records
            .entry(record.collection())
            .or_default()
            .push(record);
        id
    }

    pub fn set_simulate_fetch_error(&mut self, simulate: bool) {
        self.simulate_fetch_error = simulate;
    }

    pub fn set_simulate_delete_error(&mut self, simulate: bool) {
        self.simulate_delete_error = simulate;
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.records.get(&collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_all(&self, collection: Collection) -> Result<Vec<Record>> {
        if self.simulate_fetch_error {
            return Err(CareError::Store("Simulated fetch error".to_string()));
        }
        Ok(self.records.get(&collection).cloned().unwrap_or_default())
    }

    fn delete_by_id(&mut self, collection: Collection, id: &str) -> Result<()> {
        self.delete_calls += 1;
        if self.simulate_delete_error {
            return Err(CareError::Store("Simulated delete error".to_string()));
        }
        let records = self.records.entry(collection).or_default();
        let before = records.len();
        records.retain(|record| record.id() != id);
        if records.len() == before {
            return Err(CareError::RecordNotFound(id.to_string()));
        }
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{DocTime, FormType, Patient, Report};

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        /// `count` patients named `Patient 1..count`, registered `i/24`.
        pub fn with_patients(mut self, count: usize) -> Self {
            for i in 1..=count {
                let mut patient = Patient::new(format!("patient-{}", i), format!("Patient {}", i));
                patient.registernumber = Some(format!("{}/24", i));
                self.store.insert(Record::Patient(patient));
            }
            self
        }

        pub fn with_patient(mut self, patient: Patient) -> Self {
            self.store.insert(Record::Patient(patient));
            self
        }

        /// `count` NHC reports submitted on consecutive days from 2024-01-01.
        pub fn with_reports(mut self, count: usize) -> Self {
            for i in 1..=count {
                let mut report =
                    Report::new(format!("report-{}", i), format!("Report {}", i), FormType::Nhc);
                report.submitted_at = Some(DocTime::Text(format!(
                    "2024-01-{:02}T09:00:00Z",
                    (i - 1) % 28 + 1
                )));
                self.store.insert(Record::Report(report));
            }
            self
        }

        pub fn with_report(mut self, report: Report) -> Self {
            self.store.insert(Record::Report(report));
            self
        }
    }
}
