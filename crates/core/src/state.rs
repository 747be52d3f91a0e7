//! Per-domain list state.
//!
//! `ListState` is the single owner of fetched items plus the search text, sort
//! key and page cursor. It never performs I/O: the shell asks it for a
//! [`Ticket`] before fetching and hands the outcome back through
//! [`ListState::resolve`]. Each ticket carries a monotonically increasing
//! [`RequestToken`]; outcomes for anything but the latest ticket are stale and
//! ignored.

use serde::Serialize;

use crate::engine;
use crate::error::FetchError;
use crate::item::{Item, PageOptions, Pagination};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Loading => write!(f, "loading"),
            Phase::Ready => write!(f, "ready"),
            Phase::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

/// Permission to run one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub token: RequestToken,
    pub options: PageOptions,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    token: RequestToken,
    page: usize,
}

/// What `resolve` did with a fetch outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Items replaced, phase is `Ready`
    Applied,
    /// Phase is `Error`, items untouched
    Failed(FetchError),
    /// The outcome belonged to a superseded ticket and was dropped
    Stale,
}

/// Result of a page-change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    /// Already at the requested boundary
    Unchanged,
    /// Client-side: the visible slice moved
    Resliced,
    /// Server-side: this page has to be fetched
    Fetch(usize),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("page changes are only allowed once the list is ready (currently {0})")]
    NotReady(Phase),
}

/// Initial query settings for a list
#[derive(Debug, Clone)]
pub struct Query<K> {
    pub search: String,
    pub sort: K,
    pub page: usize,
}

impl<K: Default> Default for Query<K> {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: K::default(),
            page: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListState<I: Item> {
    items: Vec<I>,
    filtered: Vec<I>,
    search: String,
    sort: I::SortKey,
    page: usize,
    page_size: usize,
    pagination: Pagination,
    phase: Phase,
    last_error: Option<FetchError>,
    loaded_once: bool,
    next_token: u64,
    in_flight: Option<InFlight>,
}

impl<I: Item> ListState<I> {
    pub fn new(page_size: usize, pagination: Pagination) -> Self {
        Self::with_query(page_size, pagination, Query::default())
    }

    pub fn with_query(page_size: usize, pagination: Pagination, query: Query<I::SortKey>) -> Self {
        Self {
            items: vec![],
            filtered: vec![],
            search: query.search,
            sort: query.sort,
            page: query.page.max(1),
            page_size: page_size.max(1),
            pagination,
            phase: Phase::Idle,
            last_error: None,
            loaded_once: false,
            next_token: 0,
            in_flight: None,
        }
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Items after search and sort, before pagination
    pub fn filtered(&self) -> &[I] {
        &self.filtered
    }

    /// The items on the current page
    pub fn visible(&self) -> &[I] {
        match self.pagination {
            Pagination::Server => &self.filtered,
            Pagination::Client { .. } => {
                let (start, end) =
                    engine::page_bounds(self.filtered.len(), self.page, self.page_size);
                &self.filtered[start..end]
            }
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> I::SortKey {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded_once
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Total pages when known; server-side totals are not reported upstream
    pub fn total_pages(&self) -> Option<usize> {
        match self.pagination {
            Pagination::Server => None,
            Pagination::Client { .. } => {
                Some(engine::total_pages(self.filtered.len(), self.page_size))
            }
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        match self.pagination {
            // A short batch means the remote list is exhausted.
            Pagination::Server => self.items.len() >= self.page_size,
            Pagination::Client { .. } => {
                self.page < engine::total_pages(self.filtered.len(), self.page_size)
            }
        }
    }

    /// Enter `Loading` and issue a ticket for `page`
    ///
    /// Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self, page: usize) -> Ticket {
        let page = page.max(1);
        self.next_token += 1;
        let token = RequestToken(self.next_token);

        self.in_flight = Some(InFlight { token, page });
        self.phase = Phase::Loading;

        let options = match self.pagination {
            Pagination::Server => PageOptions::new(page as u32, self.page_size as u32),
            Pagination::Client { batch_size } => PageOptions::new(1, batch_size),
        };

        Ticket { token, options }
    }

    /// Apply the outcome of the fetch identified by `token`
    pub fn resolve(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<I>, FetchError>,
    ) -> Resolution {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.token == token => in_flight,
            _ => return Resolution::Stale,
        };
        self.in_flight = None;

        match outcome {
            Ok(items) => {
                self.items = items;
                self.loaded_once = true;
                self.last_error = None;
                self.phase = Phase::Ready;
                if self.pagination == Pagination::Server {
                    self.page = in_flight.page;
                }
                self.refresh();
                Resolution::Applied
            }
            Err(err) => {
                self.phase = Phase::Error;
                self.last_error = Some(err.clone());
                Resolution::Failed(err)
            }
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: I::SortKey) {
        self.sort = sort;
        self.refresh();
    }

    /// Back to the default search, sort and first page
    pub fn reset_query(&mut self) {
        self.search.clear();
        self.sort = I::SortKey::default();
        if matches!(self.pagination, Pagination::Client { .. }) {
            self.page = 1;
        }
        self.refresh();
    }

    /// Work out what moving `delta` pages means
    ///
    /// Client-side moves are applied immediately. Server-side moves only
    /// report the target page; the cursor changes once that page arrives.
    pub fn change_page(&mut self, delta: i64) -> Result<PageMove, StateError> {
        if self.phase != Phase::Ready {
            return Err(StateError::NotReady(self.phase));
        }

        let target = offset_page(self.page, delta);

        match self.pagination {
            Pagination::Client { .. } => {
                let target = engine::clamp_page(target, self.filtered.len(), self.page_size);
                if target == self.page {
                    Ok(PageMove::Unchanged)
                } else {
                    self.page = target;
                    Ok(PageMove::Resliced)
                }
            }
            Pagination::Server => {
                if target == self.page || (target > self.page && !self.has_next()) {
                    Ok(PageMove::Unchanged)
                } else {
                    Ok(PageMove::Fetch(target))
                }
            }
        }
    }

    /// Recompute the filtered sequence and re-clamp the client-side page
    fn refresh(&mut self) {
        self.filtered = engine::apply(&self.items, &self.search, self.sort);
        if matches!(self.pagination, Pagination::Client { .. }) {
            self.page = engine::clamp_page(self.page, self.filtered.len(), self.page_size);
        }
    }
}

fn offset_page(page: usize, delta: i64) -> usize {
    let moved = if delta.is_negative() {
        page.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        page.saturating_add(delta as usize)
    };
    moved.max(1)
}
