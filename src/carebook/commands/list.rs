use crate::commands::{CmdMessage, CmdResult};
use crate::config::CarebookConfig;
use crate::error::{CareError, Result};
use crate::model::Collection;
use crate::query::{FilterState, SortState};
use crate::store::RecordStore;
use crate::view::{ListView, LoadState};

/// Inputs for one listing. `sort: None` keeps the collection's default order.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub filter: FilterState,
    pub sort: Option<SortState>,
    pub page: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            filter: FilterState::default(),
            sort: None,
            page: 1,
        }
    }
}

pub fn run<S: RecordStore>(
    store: &S,
    config: &CarebookConfig,
    collection: Collection,
    options: &ListOptions,
) -> Result<CmdResult> {
    let mut view = ListView::new(collection, config);
    let mut result = CmdResult::default();

    match view.load(store) {
        Ok(()) => {}
        Err(CareError::Fetch { .. }) => {
            if let LoadState::Failed(banner) = view.load_state() {
                result.add_message(CmdMessage::error(banner.clone()));
            }
            return Ok(result);
        }
        Err(e) => return Err(e),
    }

    view.set_filter(options.filter.clone());
    if let Some(sort) = options.sort {
        view.set_sort(sort);
    }
    if options.page > 1 && !view.go_to_page(options.page) {
        let last = view.current().page_count;
        result.add_message(CmdMessage::warning(format!(
            "Page {} is out of range (1-{}), showing page 1",
            options.page, last
        )));
    }

    let page = view.current();
    if page.total == 0 && !options.filter.is_open() {
        result.add_message(CmdMessage::info("No records match the current filters."));
    }
    Ok(result.with_page(page))
}
