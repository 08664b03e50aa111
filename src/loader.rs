//! Incremental, append-only loading of city search results.

use crate::types::CityRecord;

pub const PAGE_SIZE: usize = 20;

/// Identifies the (search term, page) a request was issued for. A response is
/// only applied while its tag is still the loader's pending tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTag {
    pub term: String,
    pub page: u32,
}

/// One page of the city search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub start: usize,
    pub rows: usize,
}

impl PageTag {
    pub fn request(&self) -> PageRequest {
        PageRequest {
            query: self.term.clone(),
            start: (self.page.saturating_sub(1) as usize) * PAGE_SIZE,
            rows: PAGE_SIZE,
        }
    }
}

/// What happened to a delivered page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Appended(usize),
    Failed,
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct CityLoader {
    records: Vec<CityRecord>,
    term: String,
    loaded_pages: u32,
    exhausted: bool,
    pending: Option<PageTag>,
    last_error: Option<String>,
}

impl CityLoader {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Page cursor: the page being fetched, or the last one loaded
    pub fn page(&self) -> u32 {
        self.pending
            .as_ref()
            .map(|tag| tag.page)
            .unwrap_or(self.loaded_pages.max(1))
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start over with a new search term. Returns the page-1 request that must
    /// be issued; any response still in flight for the old term becomes stale.
    pub fn reset_search(&mut self, term: impl Into<String>) -> PageTag {
        self.term = term.into();
        self.records.clear();
        self.loaded_pages = 0;
        self.exhausted = false;
        self.last_error = None;

        let tag = PageTag {
            term: self.term.clone(),
            page: 1,
        };
        self.pending = Some(tag.clone());
        tag
    }

    /// Advance the cursor by one page. `None` once the results are exhausted
    /// or while another page is still loading.
    pub fn next_page(&mut self) -> Option<PageTag> {
        if self.exhausted || self.pending.is_some() {
            return None;
        }
        let tag = PageTag {
            term: self.term.clone(),
            page: self.loaded_pages + 1,
        };
        self.pending = Some(tag.clone());
        Some(tag)
    }

    /// Deliver the result of a page request.
    pub fn apply(&mut self, tag: &PageTag, result: Result<Vec<CityRecord>, String>) -> PageOutcome {
        if self.pending.as_ref() != Some(tag) {
            tracing::debug!(term = %tag.term, page = tag.page, "discarding stale city page");
            return PageOutcome::Stale;
        }
        self.pending = None;

        match result {
            Ok(cities) => {
                let count = cities.len();
                if count < PAGE_SIZE {
                    self.exhausted = true;
                }
                self.records.extend(cities);
                self.loaded_pages = tag.page;
                self.last_error = None;
                tracing::debug!(
                    term = %tag.term,
                    page = tag.page,
                    count,
                    exhausted = self.exhausted,
                    "city page loaded"
                );
                PageOutcome::Appended(count)
            }
            Err(err) => {
                tracing::warn!(term = %tag.term, page = tag.page, error = %err, "city page failed");
                self.last_error = Some(err);
                PageOutcome::Failed
            }
        }
    }
}
