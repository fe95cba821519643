//! # Query Engine
//!
//! Turns the unfiltered base collection of a view into the page it shows:
//!
//! ```text
//! base records ──▶ filter::apply ──▶ sort::sort ──▶ page::page ──▶ Page<Record>
//! ```
//!
//! The three inputs live together in a [`QueryState`] value. Every stage is a
//! pure function of its inputs, so running the same state over the same base
//! always produces the same page. The owner of the state (see
//! [`crate::view::ListView`]) re-runs the pipeline whenever an input changes.

use crate::model::Record;
use tracing::debug;

pub mod filter;
pub mod page;
pub mod register;
pub mod sort;

pub use filter::{FilterState, StatusFilter};
pub use page::{Page, PageState};
pub use register::RegisterKey;
pub use sort::{SortDirection, SortField, SortState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pub filter: FilterState,
    pub sort: SortState,
    pub page: PageState,
}

impl QueryState {
    pub fn new(sort: SortState, page_size: usize) -> Self {
        Self {
            filter: FilterState::default(),
            sort,
            page: PageState::new(page_size),
        }
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.set_filter(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.set_sort(sort);
        self
    }

    /// A changed filter sends the view back to page 1.
    pub fn set_filter(&mut self, filter: FilterState) {
        if self.filter != filter {
            self.filter = filter;
            self.page.reset();
        }
    }

    /// A changed sort sends the view back to page 1.
    pub fn set_sort(&mut self, sort: SortState) {
        if self.sort != sort {
            self.sort = sort;
            self.page.reset();
        }
    }
}

/// Filtered and ordered records, before paging.
pub fn select(records: &[Record], query: &QueryState) -> Vec<Record> {
    let mut selected = filter::apply(records, &query.filter);
    sort::sort(&mut selected, &query.sort);
    selected
}

pub fn run(records: &[Record], query: &QueryState) -> Page<Record> {
    let selected = select(records, query);
    let window = page::page(&selected, &query.page);
    debug!(
        base = records.len(),
        matched = window.total,
        page = window.current_page,
        pages = window.page_count,
        "query pipeline ran"
    );
    window
}
