//! State of one city browser screen: the loader plus everything needed to
//! derive and navigate the displayed rows.

use crate::loader::{CityLoader, PageOutcome, PageTag};
use crate::types::CityRecord;
use crate::view::{self, Column, Dropdowns, FilterSpec, SortSpec};

/// Rows from the end of the view at which the next page is requested
pub const PREFETCH_DISTANCE: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct CityBrowser {
    pub loader: CityLoader,
    pub sort: SortSpec,
    pub filter: FilterSpec,
    pub dropdowns: Dropdowns,
    pub selected: usize,
    pub picker_index: usize,
    pub search_mode: bool,
}

impl CityBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently on screen: `filter(sort(accumulated))`
    pub fn rows(&self) -> Vec<&CityRecord> {
        view::derive(self.loader.records(), self.sort, &self.filter)
    }

    pub fn selected_city(&self) -> Option<&CityRecord> {
        self.rows().get(self.selected).copied()
    }

    pub fn set_search(&mut self, term: impl Into<String>) -> PageTag {
        self.selected = 0;
        let tag = self.loader.reset_search(term);
        self.clamp_picker();
        tag
    }

    pub fn refresh(&mut self) -> PageTag {
        let term = self.loader.term().to_string();
        self.set_search(term)
    }

    pub fn push_search_char(&mut self, c: char) -> PageTag {
        let mut term = self.loader.term().to_string();
        term.push(c);
        self.set_search(term)
    }

    /// Append pasted text as one term change. Line breaks are dropped.
    pub fn push_search_str(&mut self, text: &str) -> Option<PageTag> {
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        if text.is_empty() {
            return None;
        }
        let term = format!("{}{}", self.loader.term(), text);
        Some(self.set_search(term))
    }

    /// `None` when the term was already empty
    pub fn pop_search_char(&mut self) -> Option<PageTag> {
        let mut term = self.loader.term().to_string();
        term.pop()?;
        Some(self.set_search(term))
    }

    /// Move the selection by `delta` rows and request the next page when the
    /// selection gets close to the end of the list.
    pub fn move_selection(&mut self, delta: isize) -> Option<PageTag> {
        let len = self.rows().len();
        let last = len.saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
        self.maybe_next_page(len)
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) -> Option<PageTag> {
        let len = self.rows().len();
        self.selected = len.saturating_sub(1);
        self.maybe_next_page(len)
    }

    fn maybe_next_page(&mut self, len: usize) -> Option<PageTag> {
        if self.selected + PREFETCH_DISTANCE >= len {
            self.loader.next_page()
        } else {
            None
        }
    }

    pub fn apply_page(&mut self, tag: &PageTag, result: Result<Vec<CityRecord>, String>) -> PageOutcome {
        let outcome = self.loader.apply(tag, result);
        self.clamp_selection();
        self.clamp_picker();
        outcome
    }

    pub fn toggle_sort(&mut self, column: Column) {
        self.sort = self.sort.toggled(column);
    }

    pub fn toggle_dropdown(&mut self, column: Column) {
        self.dropdowns.toggle(column);
        self.picker_index = 0;
    }

    /// Entries of a column's value picker: the clear entry, then every value
    /// seen so far in the accumulated list
    pub fn picker_options(&self, column: Column) -> Vec<String> {
        let mut options = vec![column.clear_label().to_string()];
        options.extend(view::distinct_values(self.loader.records(), column));
        options
    }

    pub fn move_picker(&mut self, delta: isize) {
        let Some(column) = self.dropdowns.focused() else {
            return;
        };
        let last = self.picker_options(column).len().saturating_sub(1);
        self.picker_index = self.picker_index.saturating_add_signed(delta).min(last);
    }

    /// Apply the highlighted picker entry as the focused column's filter and
    /// close every picker.
    pub fn select_picker_entry(&mut self) {
        let Some(column) = self.dropdowns.focused() else {
            return;
        };
        let options = self.picker_options(column);
        let pattern = match self.picker_index {
            0 => String::new(),
            i => options.get(i).cloned().unwrap_or_default(),
        };
        self.filter.set(column, pattern);
        self.dropdowns.close_all();
        self.picker_index = 0;
        self.clamp_selection();
    }

    /// Keep the picker highlight on an existing entry after the records change
    fn clamp_picker(&mut self) {
        let last = match self.dropdowns.focused() {
            Some(column) => self.picker_options(column).len().saturating_sub(1),
            None => 0,
        };
        self.picker_index = self.picker_index.min(last);
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
