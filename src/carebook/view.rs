//! # List View
//!
//! A [`ListView`] is one mounted listing: it holds the base collection fetched
//! from the store, the single mutable [`QueryState`], the derived (filtered and
//! sorted) records and the deletion gate for that listing.
//!
//! ```text
//!            begin_load            finish_load(Ok)
//!   Idle ───────────────▶ Loading ─────────────────▶ Loaded
//!                            │
//!                            └── finish_load(Err) ──▶ Failed(banner)
//! ```
//!
//! Only one fetch may be outstanding per view. A failed fetch keeps whatever
//! base collection the view already had.
//!
//! Every input change re-derives the records and clamps the current page, so
//! the page shown is always a pure function of (base, query).

use crate::config::CarebookConfig;
use crate::error::{CareError, Result};
use crate::gate::{DeleteTarget, DeletionGate};
use crate::model::{Collection, Record};
use crate::query::{self, filter, FilterState, Page, QueryState, SortField, SortState};
use crate::store::RecordStore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

pub struct ListView {
    collection: Collection,
    base: Vec<Record>,
    derived: Vec<Record>,
    query: QueryState,
    load: LoadState,
    gate: DeletionGate,
}

/// Newest reports first; patients in register order.
pub fn default_sort(collection: Collection) -> SortState {
    match collection {
        Collection::Reports => SortState::desc(SortField::SubmittedAt),
        Collection::Patients => SortState::asc(SortField::RegisterNumber),
    }
}

impl ListView {
    pub fn new(collection: Collection, config: &CarebookConfig) -> Self {
        Self {
            collection,
            base: Vec::new(),
            derived: Vec::new(),
            query: QueryState::new(default_sort(collection), config.page_size),
            load: LoadState::Idle,
            gate: DeletionGate::new(config.confirmation_code.clone()),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// The unfiltered base collection.
    pub fn records(&self) -> &[Record] {
        &self.base
    }

    /// Records passing the current filter, in sort order.
    pub fn matched(&self) -> &[Record] {
        &self.derived
    }

    pub fn load<S: RecordStore>(&mut self, store: &S) -> Result<()> {
        self.begin_load()?;
        let fetched = store.fetch_all(self.collection);
        self.finish_load(fetched)
    }

    pub fn begin_load(&mut self) -> Result<()> {
        if self.load == LoadState::Loading {
            return Err(CareError::LoadInProgress(self.collection));
        }
        self.load = LoadState::Loading;
        Ok(())
    }

    pub fn finish_load(&mut self, fetched: Result<Vec<Record>>) -> Result<()> {
        match fetched {
            Ok(records) => {
                info!(collection = %self.collection, count = records.len(), "collection loaded");
                self.base = records;
                self.load = LoadState::Loaded;
                self.refresh();
                Ok(())
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "fetch failed");
                self.load = LoadState::Failed(format!(
                    "Failed to load {}. Please try again later.",
                    self.collection
                ));
                Err(CareError::Fetch {
                    collection: self.collection,
                    reason: e.to_string(),
                })
            }
        }
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.query.set_filter(filter);
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.query.set_sort(sort);
        self.refresh();
    }

    pub fn next_page(&mut self) -> bool {
        self.query.page.next(self.derived.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.query.page.previous(self.derived.len())
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.query.page.go_to(page, self.derived.len())
    }

    /// The window currently on screen.
    pub fn current(&self) -> Page<Record> {
        query::page::page(&self.derived, &self.query.page)
    }

    pub fn diagnosis_options(&self) -> Vec<String> {
        filter::diagnosis_options(&self.base)
    }

    pub fn pending_delete(&self) -> Option<&DeleteTarget> {
        self.gate.pending()
    }

    /// Arms the deletion gate for a record in this view.
    pub fn request_delete(&mut self, id: &str) -> Result<()> {
        if !self.base.iter().any(|r| r.id() == id) {
            return Err(CareError::RecordNotFound(id.to_string()));
        }
        self.gate.request(self.collection, id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) -> Option<DeleteTarget> {
        self.gate.cancel()
    }

    /// Confirms the pending delete. On success the record leaves both the base
    /// collection and the derived view; on any error the listing is untouched.
    pub fn confirm_delete<S: RecordStore>(
        &mut self,
        code: &str,
        store: &mut S,
    ) -> Result<DeleteTarget> {
        let target = self.gate.confirm(code, store)?;
        self.base.retain(|r| r.id() != target.id);
        self.derived.retain(|r| r.id() != target.id);
        self.query.page.clamp(self.derived.len());
        Ok(target)
    }

    fn refresh(&mut self) {
        self.derived = query::select(&self.base, &self.query);
        self.query.page.clamp(self.derived.len());
        debug!(
            collection = %self.collection,
            base = self.base.len(),
            matched = self.derived.len(),
            page = self.query.page.current_page,
            "view refreshed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::StatusFilter;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    fn config(page_size: usize) -> CarebookConfig {
        CarebookConfig {
            page_size,
            ..CarebookConfig::default()
        }
    }

    fn loaded(store: &InMemoryStore, collection: Collection, page_size: usize) -> ListView {
        let mut view = ListView::new(collection, &config(page_size));
        view.load(store).unwrap();
        view
    }

    fn ids(page: &Page<Record>) -> Vec<&str> {
        page.items.iter().map(Record::id).collect()
    }

    #[test]
    fn load_populates_base_and_first_page() {
        let store = StoreFixture::new().with_patients(8).store;
        let view = loaded(&store, Collection::Patients, 6);

        assert_eq!(view.load_state(), &LoadState::Loaded);
        assert_eq!(view.records().len(), 8);
        let page = view.current();
        assert_eq!(page.items.len(), 6);
        assert_eq!(page.page_count, 2);
        assert_eq!(ids(&page)[0], "patient-1");
    }

    #[test]
    fn reports_default_to_newest_first() {
        let store = StoreFixture::new().with_reports(3).store;
        let view = loaded(&store, Collection::Reports, 6);
        assert_eq!(ids(&view.current()), vec!["report-3", "report-2", "report-1"]);
    }

    #[test]
    fn failed_load_keeps_previous_base() {
        let mut store = StoreFixture::new().with_patients(3).store;
        let mut view = loaded(&store, Collection::Patients, 6);

        store.set_simulate_fetch_error(true);
        assert!(matches!(
            view.load(&store),
            Err(CareError::Fetch {
                collection: Collection::Patients,
                ..
            })
        ));
        assert_eq!(
            view.load_state(),
            &LoadState::Failed("Failed to load patients. Please try again later.".into())
        );
        assert_eq!(view.records().len(), 3);
        assert_eq!(view.current().total, 3);
    }

    #[test]
    fn only_one_load_outstanding() {
        let mut view = ListView::new(Collection::Reports, &config(6));
        view.begin_load().unwrap();
        assert!(matches!(
            view.begin_load(),
            Err(CareError::LoadInProgress(Collection::Reports))
        ));
        view.finish_load(Ok(Vec::new())).unwrap();
        assert!(view.begin_load().is_ok());
    }

    #[test]
    fn filter_change_resets_page() {
        let store = StoreFixture::new().with_patients(20).store;
        let mut view = loaded(&store, Collection::Patients, 6);
        assert!(view.go_to_page(3));

        view.set_filter(FilterState::default().with_status(StatusFilter::Active));
        assert_eq!(view.query().page.current_page, 1);
        assert_eq!(view.current().total, 20);

        view.set_filter(FilterState::default().with_text("patient 1"));
        // Patient 1 and Patient 10..=19
        assert_eq!(view.current().total, 11);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let store = StoreFixture::new().with_patients(7).store;
        let mut view = loaded(&store, Collection::Patients, 6);
        assert!(!view.previous_page());
        assert!(view.next_page());
        assert!(!view.next_page());
        assert!(!view.go_to_page(5));
        assert_eq!(view.current().items.len(), 1);
    }

    #[test]
    fn confirmed_delete_removes_from_base_and_view() {
        let mut store = StoreFixture::new().with_patients(7).store;
        let mut view = loaded(&store, Collection::Patients, 6);
        view.next_page();

        view.request_delete("patient-7").unwrap();
        let target = view.confirm_delete("2012", &mut store).unwrap();
        assert_eq!(target.id, "patient-7");

        assert_eq!(view.records().len(), 6);
        assert!(view.matched().iter().all(|r| r.id() != "patient-7"));
        // the second page emptied, so the view falls back to page 1
        assert_eq!(view.current().current_page, 1);
        assert_eq!(store.len(Collection::Patients), 6);
    }

    #[test]
    fn mismatched_code_leaves_listing_alone() {
        let mut store = StoreFixture::new().with_patients(2).store;
        let mut view = loaded(&store, Collection::Patients, 6);

        view.request_delete("patient-1").unwrap();
        assert!(matches!(
            view.confirm_delete("nope", &mut store),
            Err(CareError::ConfirmationMismatch)
        ));
        assert_eq!(view.pending_delete().map(|t| t.id.as_str()), Some("patient-1"));
        assert_eq!(view.records().len(), 2);
        assert_eq!(store.delete_calls(), 0);
    }

    #[test]
    fn failed_delete_leaves_listing_alone() {
        let mut store = StoreFixture::new().with_patients(2).store;
        let mut view = loaded(&store, Collection::Patients, 6);
        store.set_simulate_delete_error(true);

        view.request_delete("patient-2").unwrap();
        assert!(matches!(
            view.confirm_delete("2012", &mut store),
            Err(CareError::Delete { .. })
        ));
        assert!(view.pending_delete().is_none());
        assert_eq!(view.records().len(), 2);
        assert_eq!(view.matched().len(), 2);
    }

    #[test]
    fn request_delete_requires_known_record() {
        let store = StoreFixture::new().with_patients(1).store;
        let mut view = loaded(&store, Collection::Patients, 6);
        assert!(matches!(
            view.request_delete("ghost"),
            Err(CareError::RecordNotFound(_))
        ));
        assert!(view.pending_delete().is_none());
    }
}
