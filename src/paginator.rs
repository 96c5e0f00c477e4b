use tracing::{debug, trace};

// Page window plus the server reported record count.
// current_page is 1-based, the paginator widget works with 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub rows_per_page: usize,
    pub total_records: u64,
}

impl PageState {
    pub fn new(current_page: usize, rows_per_page: usize) -> Self {
        Self {
            current_page: current_page.max(1),
            rows_per_page: rows_per_page.max(1),
            total_records: 0,
        }
    }

    pub fn window(&self) -> (usize, usize) {
        (self.current_page, self.rows_per_page)
    }

    pub fn on_page_change(&mut self, zero_based: usize) {
        self.current_page = zero_based + 1;
        trace!("Page changed to {}", self.current_page);
    }

    // Returns false when the input was rejected, in which case nothing changed.
    pub fn on_rows_per_page_input(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<usize>() {
            Ok(rows) if rows > 0 => {
                self.rows_per_page = rows;
                self.current_page = 1;
                debug!("Rows per page set to {rows}");
                true
            }
            _ => {
                trace!("Rejected rows per page input {raw:?}");
                false
            }
        }
    }

    // Index of the first record on the current page
    pub fn first(&self) -> u64 {
        (self.current_page as u64 - 1) * self.rows_per_page as u64
    }

    pub fn page_count(&self) -> usize {
        let pages = self.total_records.div_ceil(self.rows_per_page as u64);
        (pages as usize).max(1)
    }

    pub fn page_index(&self) -> usize {
        self.current_page - 1
    }

    pub fn next_index(&self) -> usize {
        (self.page_index() + 1).min(self.page_count() - 1)
    }

    pub fn prev_index(&self) -> usize {
        self.page_index().saturating_sub(1)
    }

    pub fn first_index(&self) -> usize {
        0
    }

    pub fn last_index(&self) -> usize {
        self.page_count() - 1
    }

    // 1-based inclusive record range shown on the current page, None if the page is empty
    pub fn record_range(&self, rows_on_page: usize) -> Option<(u64, u64)> {
        if rows_on_page == 0 {
            return None;
        }
        let first = self.first() + 1;
        Some((first, first + rows_on_page as u64 - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_change_converts_zero_based_index() {
        let mut state = PageState::new(1, 10);
        state.on_page_change(3);
        assert_eq!(state.window(), (4, 10));
    }

    #[test]
    fn invalid_rows_input_is_rejected() {
        let mut state = PageState::new(3, 15);
        for raw in ["0", "-5", "abc", "", "2.5"] {
            assert!(!state.on_rows_per_page_input(raw));
            assert_eq!(state.window(), (3, 15));
        }
    }

    #[test]
    fn valid_rows_input_resets_page() {
        let mut state = PageState::new(7, 10);
        assert!(state.on_rows_per_page_input("25"));
        assert_eq!(state.window(), (1, 25));
        assert!(state.on_rows_per_page_input(" 5 "));
        assert_eq!(state.window(), (1, 5));
    }

    #[test]
    fn page_count_rounds_up_and_is_at_least_one() {
        let mut state = PageState::new(1, 10);
        assert_eq!(state.page_count(), 1);
        state.total_records = 42;
        assert_eq!(state.page_count(), 5);
        state.total_records = 40;
        assert_eq!(state.page_count(), 4);
    }

    #[test]
    fn navigation_clamps_to_available_pages() {
        let mut state = PageState::new(1, 10);
        state.total_records = 25;
        assert_eq!(state.prev_index(), 0);
        assert_eq!(state.next_index(), 1);
        assert_eq!(state.last_index(), 2);
        state.on_page_change(2);
        assert_eq!(state.next_index(), 2);
        assert_eq!(state.first_index(), 0);
    }

    #[test]
    fn first_and_range_follow_window() {
        let mut state = PageState::new(3, 20);
        state.total_records = 100;
        assert_eq!(state.first(), 40);
        assert_eq!(state.record_range(20), Some((41, 60)));
        assert_eq!(state.record_range(0), None);
    }
}
