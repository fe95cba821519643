//! Fixed-size page windows over an ordered result.
//!
//! Pages are 1-based. There is always at least one page, even for an empty
//! result, and navigation never leaves `[1, page_count]`.

pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    /// Returns whether the page changed.
    pub fn next(&mut self, total: usize) -> bool {
        self.go_to(self.current_page + 1, total)
    }

    pub fn previous(&mut self, total: usize) -> bool {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to(page, total),
            None => false,
        }
    }

    /// Out-of-range targets are ignored.
    pub fn go_to(&mut self, page: usize, total: usize) -> bool {
        if page < 1 || page > self.page_count(total) || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Pulls the current page back into range after the result size changed.
    pub fn clamp(&mut self, total: usize) {
        self.current_page = self.current_page.clamp(1, self.page_count(total));
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// Cuts the window for `state` out of `records`. A page past the end is empty.
pub fn page<T: Clone>(records: &[T], state: &PageState) -> Page<T> {
    let size = state.page_size.max(1);
    let start = state.current_page.saturating_sub(1).saturating_mul(size);
    Page {
        items: records.iter().skip(start).take(size).cloned().collect(),
        current_page: state.current_page,
        page_count: state.page_count(records.len()),
        total: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn twenty_five_items_in_pages_of_ten() {
        let records = items(25);
        let mut state = PageState::new(10);
        assert_eq!(state.page_count(records.len()), 3);

        assert!(state.go_to(3, records.len()));
        let last = page(&records, &state);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(last.page_count, 3);
        assert!(!last.has_next());

        assert!(!state.next(records.len()));
        assert_eq!(state.current_page, 3);
    }

    #[test]
    fn empty_result_has_one_empty_page() {
        let state = PageState::new(6);
        let p = page::<usize>(&[], &state);
        assert_eq!(p.page_count, 1);
        assert!(p.items.is_empty());
        assert!(!p.has_previous());
    }

    #[test]
    fn previous_is_noop_on_first_page() {
        let mut state = PageState::new(6);
        assert!(!state.previous(20));
        assert_eq!(state.current_page, 1);
        assert!(state.next(20));
        assert!(state.previous(20));
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn go_to_ignores_out_of_range() {
        let mut state = PageState::new(6);
        assert!(!state.go_to(0, 20));
        assert!(!state.go_to(5, 20));
        assert!(state.go_to(4, 20));
        assert_eq!(state.current_page, 4);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let state = PageState {
            current_page: 9,
            page_size: 6,
        };
        let p = page(&items(10), &state);
        assert!(p.items.is_empty());
        assert_eq!(p.page_count, 2);
    }

    #[test]
    fn clamp_pulls_page_back_into_range() {
        let mut state = PageState::new(5);
        state.go_to(4, 20);
        state.clamp(7);
        assert_eq!(state.current_page, 2);
        state.clamp(0);
        assert_eq!(state.current_page, 1);
    }

    #[test]
    fn zero_page_size_is_coerced() {
        let state = PageState::new(0);
        assert_eq!(state.page_size, 1);
        assert_eq!(state.page_count(3), 3);
    }
}
