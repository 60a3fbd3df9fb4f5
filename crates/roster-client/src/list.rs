use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::time::Duration;

use roster_types::{PaginatedResult, User};

use crate::ticket::{Generation, Ticket};
use crate::ClientError;

/// Quiet period after the last keystroke before the search runs.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// A fetch the view must perform and report back through
/// [`UsersTable::apply_page`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub page: NonZeroU32,
    pub search: String,
}

/// State of the users table: the current page, the search box, and the
/// two-step delete confirmation.
#[derive(Debug)]
pub struct UsersTable {
    page: PaginatedResult<User>,
    search: String,
    loading: bool,
    pending_delete: Option<i64>,
    deleting: bool,
    fetches: Generation,
    keystrokes: Generation,
}

impl Default for UsersTable {
    fn default() -> Self {
        Self::new()
    }
}

impl UsersTable {
    pub fn new() -> Self {
        Self {
            page: PaginatedResult::default(),
            search: String::new(),
            loading: false,
            pending_delete: None,
            deleting: false,
            fetches: Generation::default(),
            keystrokes: Generation::default(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.page.data
    }

    pub fn current_page(&self) -> u32 {
        self.page.current_page
    }

    pub fn last_page(&self) -> u32 {
        self.page.last_page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Starts loading `page` with the current search. Any fetch still in
    /// flight becomes stale.
    pub fn fetch(&mut self, page: NonZeroU32) -> FetchRequest {
        self.loading = true;
        FetchRequest {
            ticket: self.fetches.issue(),
            page,
            search: self.search.clone(),
        }
    }

    /// Applies a fetch result. Returns `None` when the response was stale and
    /// got dropped, otherwise the outcome for the view to report.
    pub fn apply_page(
        &mut self,
        ticket: Ticket,
        result: Result<PaginatedResult<User>, ClientError>,
    ) -> Option<Result<(), ClientError>> {
        if !self.fetches.is_current(ticket) {
            return None;
        }
        self.loading = false;
        Some(result.map(|page| self.page = page))
    }

    pub fn change_page(&mut self, page: u32) -> Option<FetchRequest> {
        let page = NonZeroU32::new(page)?;
        if page.get() == self.page.current_page {
            return None;
        }
        Some(self.fetch(page))
    }

    /// Records a keystroke. The view waits [`SEARCH_DEBOUNCE`] and then calls
    /// [`UsersTable::debounce_elapsed`] with the returned ticket.
    pub fn search_input(&mut self, value: impl Into<String>) -> Ticket {
        self.search = value.into();
        self.keystrokes.issue()
    }

    /// Only the last keystroke of a burst produces a fetch, always of page 1.
    pub fn debounce_elapsed(&mut self, ticket: Ticket) -> Option<FetchRequest> {
        if !self.keystrokes.is_current(ticket) {
            return None;
        }
        Some(self.fetch(NonZeroU32::MIN))
    }

    pub fn request_delete(&mut self, id: i64) {
        if !self.deleting {
            self.pending_delete = Some(id);
        }
    }

    pub fn cancel_delete(&mut self) {
        if !self.deleting {
            self.pending_delete = None;
        }
    }

    /// Returns the id to delete, once, while a confirmation is open.
    pub fn confirm_delete(&mut self) -> Option<i64> {
        if self.deleting {
            return None;
        }
        let id = self.pending_delete?;
        self.deleting = true;
        Some(id)
    }

    /// Closes the confirmation. On success returns the server message and the
    /// refetch to run: the previous page when the deleted row was alone on a
    /// later page, the current page otherwise. Failure leaves the rows as
    /// they were.
    pub fn apply_delete(
        &mut self,
        result: Result<String, ClientError>,
    ) -> Result<(String, FetchRequest), ClientError> {
        self.deleting = false;
        self.pending_delete = None;
        let message = result?;

        let current = self.page.current_page;
        let target = if self.page.data.len() == 1 && current > 1 {
            current - 1
        } else {
            current
        };
        let page = NonZeroU32::new(target).unwrap_or(NonZeroU32::MIN);
        Ok((message, self.fetch(page)))
    }

    /// One-based position of the row at `index` across all pages.
    pub fn row_number(&self, index: usize) -> u64 {
        let skipped = u64::from(self.page.current_page.saturating_sub(1));
        skipped * u64::from(self.page.per_page) + index as u64 + 1
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        1..=self.page.last_page.max(1)
    }

    pub fn show_pagination(&self) -> bool {
        !self.loading
    }
}
