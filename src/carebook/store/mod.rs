//! # Storage Layer
//!
//! Records live in an external document store. This module defines the
//! [`RecordStore`] trait, the only boundary the rest of the crate talks to,
//! and two implementations of it.
//!
//! ## Contract
//!
//! - `fetch_all` returns the whole, unfiltered collection. All querying
//!   happens client-side in [`crate::query`].
//! - Documents are decoded into [`Record`]s inside the store, so callers never
//!   see raw JSON. A document that cannot be decoded is logged and skipped; it
//!   does not fail the fetch.
//! - `delete_by_id` is final. There is no soft delete and no undo; concurrent
//!   writers are resolved by the backend (last writer wins).
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: documents exported as JSON, one file per collection
//! - [`memory::InMemoryStore`]: for tests, with failure simulation
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── Reports.json    # [ {"id": "...", "formType": "NHC", ...}, ... ]
//! ├── patients.json   # or { "<id>": { ... }, ... }
//! └── config.json     # CarebookConfig
//! ```

use crate::error::{CareError, Result};
use crate::model::{Collection, Record};

pub mod fs;
pub mod memory;

/// Abstract interface for the record backend.
pub trait RecordStore {
    /// Every record in the collection, in backend order.
    fn fetch_all(&self, collection: Collection) -> Result<Vec<Record>>;

    /// A single record, for detail views.
    fn fetch_one(&self, collection: Collection, id: &str) -> Result<Record> {
        self.fetch_all(collection)?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| CareError::RecordNotFound(id.to_string()))
    }

    /// Permanently removes a record.
    fn delete_by_id(&mut self, collection: Collection, id: &str) -> Result<()>;
}
