/// List-view controller: one per paginated screen.
///
/// Owns the item cache, the pagination cursor and the search/filter inputs,
/// and decides when a fetch is due. The screen translates those decisions
/// into tasks; responses come back tagged with the sequence number of the
/// fetch that produced them, and anything older than the latest issued
/// fetch is discarded so a slow response can never overwrite a fresher one.
use crate::api::types::{Page, Pagination};
use crate::api::{ApiError, ListQuery};

/// Settle delay before a search edit triggers a fetch.
pub const SEARCH_SETTLE_MS: u64 = 500;

/// Page size choices offered by the pagination bar.
pub const PAGE_SIZES: [u32; 4] = [5, 10, 25, 50];

const WINDOW: u32 = 5;

#[derive(Debug)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
    /// Raw search text, updated on every keystroke.
    pub search: String,
    /// Search text as of the last settled debounce; this is what fetches use.
    debounced_search: String,
    /// Categorical filter value; `None` means the sentinel "all" choice.
    pub filter: Option<String>,
    /// Current page, 1-based. Not clamped here: the pagination bar disables
    /// out-of-range navigation.
    pub page: u32,
    pub per_page: u32,
    pub loading: bool,
    pub error: Option<String>,
    debounce_seq: u64,
    fetch_seq: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        ListState {
            items: Vec::new(),
            pagination: Pagination::default(),
            search: String::new(),
            debounced_search: String::new(),
            filter: None,
            page: 1,
            per_page: 10,
            loading: false,
            error: None,
            debounce_seq: 0,
            fetch_seq: 0,
        }
    }
}

/// What happened to a fetch response once it came back.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Latest response; the list and cursor were replaced wholesale.
    Fresh,
    /// Superseded by a newer fetch and discarded.
    Stale,
    /// The request failed; the previous list was kept and a message set.
    Failed,
    /// The session is no longer valid; the caller must sign the user out.
    Expired,
}

impl<T> ListState<T> {
    /// Record a keystroke in the search field. The raw value updates
    /// immediately; the returned sequence number identifies the debounce
    /// timer the caller should start. Only the newest timer wins.
    pub fn search_input(&mut self, value: String) -> u64 {
        self.search = value;
        self.debounce_seq += 1;
        self.debounce_seq
    }

    /// A debounce timer fired. Returns true when it was the newest timer,
    /// in which case the settled value takes effect and the caller should
    /// fetch from page 1.
    pub fn search_settled(&mut self, seq: u64) -> bool {
        if seq != self.debounce_seq {
            return false;
        }
        self.debounced_search = self.search.clone();
        self.page = 1;
        true
    }

    /// Filter changes take effect immediately, from page 1.
    pub fn filter_changed(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn page_changed(&mut self, page: u32) {
        self.page = page;
    }

    pub fn per_page_changed(&mut self, per_page: u32) {
        self.per_page = per_page;
        self.page = 1;
    }

    /// Issue a new fetch: advances the fence and returns the tagged query.
    pub fn begin_fetch(&mut self) -> (u64, ListQuery) {
        self.fetch_seq += 1;
        self.loading = true;
        let query = ListQuery {
            page: self.page,
            per_page: self.per_page,
            search: (!self.debounced_search.is_empty()).then(|| self.debounced_search.clone()),
            filter: self.filter.clone(),
        };
        (self.fetch_seq, query)
    }

    /// Apply a fetch response. Responses older than the latest issued fetch
    /// are discarded without touching any state.
    pub fn apply(&mut self, seq: u64, result: Result<Page<T>, ApiError>) -> Applied {
        if seq != self.fetch_seq {
            return Applied::Stale;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.items = page.items;
                self.pagination = page.pagination;
                self.error = None;
                Applied::Fresh
            }
            Err(ApiError::Unauthorized) => Applied::Expired,
            Err(err) => {
                self.error = Some(err.user_message());
                Applied::Failed
            }
        }
    }

    pub fn debounced_search(&self) -> &str {
        &self.debounced_search
    }

    pub fn window(&self) -> Vec<u32> {
        page_window(self.page, self.pagination.last_page)
    }
}

/// At most five page numbers centered on the current page. Near the
/// boundaries the window is translated, never truncated, as long as there
/// are at least five pages in total.
pub fn page_window(current: u32, last: u32) -> Vec<u32> {
    if last <= WINDOW {
        return (1..=last).collect();
    }
    let start = current
        .saturating_sub(WINDOW / 2)
        .max(1)
        .min(last - WINDOW + 1);
    (start..start + WINDOW).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<&'static str>, current_page: u32) -> Page<&'static str> {
        let total = items.len() as u64;
        Page {
            items,
            pagination: Pagination {
                total,
                per_page: 10,
                current_page,
                last_page: 3,
            },
        }
    }

    #[test]
    fn rapid_search_edits_settle_into_one_fetch() {
        let mut list: ListState<&str> = ListState::default();
        list.page = 3;

        let first = list.search_input("d".to_string());
        let second = list.search_input("du".to_string());
        let last = list.search_input("dune".to_string());

        // Earlier timers fire but are no longer the newest.
        assert!(!list.search_settled(first));
        assert!(!list.search_settled(second));
        assert_eq!(list.page, 3);

        assert!(list.search_settled(last));
        assert_eq!(list.debounced_search(), "dune");
        assert_eq!(list.page, 1);

        let (_, query) = list.begin_fetch();
        assert_eq!(query.search.as_deref(), Some("dune"));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn empty_search_is_omitted_from_the_query() {
        let mut list: ListState<&str> = ListState::default();
        let seq = list.search_input(String::new());
        assert!(list.search_settled(seq));
        let (_, query) = list.begin_fetch();
        assert_eq!(query.search, None);
    }

    #[test]
    fn filter_change_resets_to_page_one() {
        let mut list: ListState<&str> = ListState::default();
        list.page = 4;
        list.filter_changed(Some("borrowed".to_string()));
        assert_eq!(list.page, 1);
        let (_, query) = list.begin_fetch();
        assert_eq!(query.filter.as_deref(), Some("borrowed"));
    }

    #[test]
    fn page_size_change_resets_to_page_one() {
        let mut list: ListState<&str> = ListState::default();
        list.page = 4;
        list.per_page_changed(25);
        assert_eq!(list.page, 1);
        assert_eq!(list.per_page, 25);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut list: ListState<&str> = ListState::default();
        let (old_seq, _) = list.begin_fetch();
        let (new_seq, _) = list.begin_fetch();

        assert_eq!(
            list.apply(old_seq, Ok(page(vec!["stale"], 1))),
            Applied::Stale
        );
        assert!(list.items.is_empty());

        assert_eq!(
            list.apply(new_seq, Ok(page(vec!["fresh"], 1))),
            Applied::Fresh
        );
        assert_eq!(list.items, vec!["fresh"]);
    }

    #[test]
    fn failure_keeps_previous_items_and_surfaces_a_message() {
        let mut list: ListState<&str> = ListState::default();
        let (seq, _) = list.begin_fetch();
        assert_eq!(list.apply(seq, Ok(page(vec!["kept"], 1))), Applied::Fresh);

        let (seq, _) = list.begin_fetch();
        let outcome = list.apply(seq, Err(ApiError::Network("refused".to_string())));
        assert_eq!(outcome, Applied::Failed);
        assert_eq!(list.items, vec!["kept"]);
        assert_eq!(
            list.error.as_deref(),
            Some("Cannot connect to server. Please try again.")
        );
    }

    #[test]
    fn expired_session_is_reported_to_the_caller() {
        let mut list: ListState<&str> = ListState::default();
        let (seq, _) = list.begin_fetch();
        assert_eq!(list.apply(seq, Err(ApiError::Unauthorized)), Applied::Expired);
    }

    #[test]
    fn page_window_is_translated_at_the_boundaries() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(5, 10), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn page_window_shrinks_only_below_five_pages() {
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(2, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(1, 0), Vec::<u32>::new());
    }
}
