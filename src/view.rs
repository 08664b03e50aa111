//! Sorted and filtered projection of the accumulated city list.
//!
//! Nothing in here mutates the accumulated records; the derived view is a
//! vector of borrowed rows rebuilt from scratch after every state change.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::CityRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Country,
    Timezone,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Name, Column::Country, Column::Timezone];

    pub fn title(&self) -> &'static str {
        match self {
            Column::Name => "City Name",
            Column::Country => "Country",
            Column::Timezone => "Timezone",
        }
    }

    /// Label of the picker entry that clears this column's filter
    pub fn clear_label(&self) -> &'static str {
        match self {
            Column::Name => "All Cities",
            Column::Country => "All Countries",
            Column::Timezone => "All Timezones",
        }
    }

    pub fn value<'a>(&self, city: &'a CityRecord) -> &'a str {
        match self {
            Column::Name => &city.name,
            Column::Country => &city.country,
            Column::Timezone => &city.timezone,
        }
    }

    fn index(&self) -> usize {
        match self {
            Column::Name => 0,
            Column::Country => 1,
            Column::Timezone => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: Option<Column>,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort produced by a header click. Reselecting the sorted column flips
    /// the direction; any other column starts ascending. There is no way back
    /// to unsorted.
    pub fn toggled(self, column: Column) -> SortSpec {
        let direction = if self.key == Some(column) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        SortSpec {
            key: Some(column),
            direction,
        }
    }
}

/// Case-insensitive substring pattern per column; empty matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    patterns: [String; 3],
}

impl FilterSpec {
    pub fn pattern(&self, column: Column) -> &str {
        &self.patterns[column.index()]
    }

    pub fn set(&mut self, column: Column, pattern: impl Into<String>) {
        self.patterns[column.index()] = pattern.into();
    }

    pub fn is_active(&self) -> bool {
        self.patterns.iter().any(|p| !p.is_empty())
    }

    pub fn matches(&self, city: &CityRecord) -> bool {
        Column::ALL.iter().all(|column| {
            let pattern = self.pattern(*column);
            pattern.is_empty()
                || column
                    .value(city)
                    .to_lowercase()
                    .contains(&pattern.to_lowercase())
        })
    }
}

/// Open/closed state of each column's value picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dropdowns {
    open: [bool; 3],
}

impl Dropdowns {
    pub fn toggle(&mut self, column: Column) {
        let slot = &mut self.open[column.index()];
        *slot = !*slot;
    }

    pub fn is_open(&self, column: Column) -> bool {
        self.open[column.index()]
    }

    pub fn close_all(&mut self) {
        self.open = [false; 3];
    }

    /// Leftmost open picker, which is the one that receives keyboard input
    pub fn focused(&self) -> Option<Column> {
        Column::ALL.into_iter().find(|c| self.is_open(*c))
    }
}

fn compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable, case-insensitive sort on `sort.key`. No-op without a key.
pub fn apply_sort<'a>(records: &[&'a CityRecord], sort: SortSpec) -> Vec<&'a CityRecord> {
    let mut sorted = records.to_vec();
    if let Some(column) = sort.key {
        sorted.sort_by(|a, b| {
            let ordering = compare(column.value(a), column.value(b));
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
    sorted
}

pub fn apply_filter<'a>(records: &[&'a CityRecord], filter: &FilterSpec) -> Vec<&'a CityRecord> {
    records
        .iter()
        .copied()
        .filter(|city| filter.matches(city))
        .collect()
}

/// `filter(sort(records))`
pub fn derive<'a>(
    records: &'a [CityRecord],
    sort: SortSpec,
    filter: &FilterSpec,
) -> Vec<&'a CityRecord> {
    let all: Vec<&CityRecord> = records.iter().collect();
    apply_filter(&apply_sort(&all, sort), filter)
}

/// Distinct values of a column in first-seen order
pub fn distinct_values(records: &[CityRecord], column: Column) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|city| column.value(city))
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Vec<CityRecord> {
        vec![
            CityRecord::new("paris", "France", "Europe/Paris"),
            CityRecord::new("Berlin", "Germany", "Europe/Berlin"),
            CityRecord::new("Paris", "United States", "America/Chicago"),
            CityRecord::new("amsterdam", "Netherlands", "Europe/Amsterdam"),
            CityRecord::new("", "Nowhere", ""),
        ]
    }

    fn names(view: &[&CityRecord]) -> Vec<String> {
        view.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn toggle_same_column_flips_direction_forever() {
        let first = SortSpec::default().toggled(Column::Name);
        assert_eq!(first.key, Some(Column::Name));
        assert_eq!(first.direction, SortDirection::Ascending);

        let second = first.toggled(Column::Name);
        assert_eq!(second.direction, SortDirection::Descending);

        let third = second.toggled(Column::Name);
        assert_eq!(third.key, Some(Column::Name));
        assert_eq!(third.direction, SortDirection::Ascending);
    }

    #[test]
    fn toggle_other_column_starts_ascending() {
        let spec = SortSpec::default()
            .toggled(Column::Name)
            .toggled(Column::Name)
            .toggled(Column::Country);
        assert_eq!(spec.key, Some(Column::Country));
        assert_eq!(spec.direction, SortDirection::Ascending);
    }

    #[test]
    fn sort_ascending_is_case_insensitive_and_stable() {
        let records = cities();
        let view = derive(&records, SortSpec::default().toggled(Column::Name), &FilterSpec::default());
        // "paris" precedes "Paris" because it arrived first
        assert_eq!(names(&view), vec!["", "amsterdam", "Berlin", "paris", "Paris"]);
    }

    #[test]
    fn sort_descending_reverses_polarity() {
        let records = cities();
        let spec = SortSpec {
            key: Some(Column::Name),
            direction: SortDirection::Descending,
        };
        let view = derive(&records, spec, &FilterSpec::default());
        assert_eq!(names(&view), vec!["paris", "Paris", "Berlin", "amsterdam", ""]);
    }

    #[test]
    fn sort_without_key_keeps_arrival_order() {
        let records = cities();
        let view = derive(&records, SortSpec::default(), &FilterSpec::default());
        assert_eq!(names(&view), vec!["paris", "Berlin", "Paris", "amsterdam", ""]);
    }

    #[test]
    fn sort_is_idempotent() {
        let records = cities();
        let spec = SortSpec::default().toggled(Column::Timezone);
        let all: Vec<&CityRecord> = records.iter().collect();
        let once = apply_sort(&all, spec);
        let twice = apply_sort(&once, spec);
        assert_eq!(once, twice);
    }

    #[test]
    fn sort_does_not_touch_accumulated_records() {
        let records = cities();
        let before = records.clone();
        let _ = derive(&records, SortSpec::default().toggled(Column::Country), &FilterSpec::default());
        assert_eq!(records, before);
    }

    #[test]
    fn filter_matches_case_insensitive_substring() {
        let records = vec![
            CityRecord::new("Paris", "France", "Europe/Paris"),
            CityRecord::new("paris", "France", "Europe/Paris"),
        ];
        let mut filter = FilterSpec::default();
        filter.set(Column::Name, "par");
        let view = derive(&records, SortSpec::default(), &filter);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn filter_requires_every_non_empty_pattern() {
        let records = cities();
        let mut filter = FilterSpec::default();
        filter.set(Column::Name, "PAR");
        filter.set(Column::Timezone, "europe");
        let view = derive(&records, SortSpec::default(), &filter);
        assert_eq!(names(&view), vec!["paris"]);
    }

    #[test]
    fn empty_pattern_matches_missing_values() {
        let records = cities();
        let mut filter = FilterSpec::default();
        filter.set(Column::Country, "nowhere");
        let view = derive(&records, SortSpec::default(), &filter);
        assert_eq!(names(&view), vec![""]);
    }

    #[test]
    fn filter_is_idempotent() {
        let records = cities();
        let mut filter = FilterSpec::default();
        filter.set(Column::Timezone, "europe/");
        let all: Vec<&CityRecord> = records.iter().collect();
        let once = apply_filter(&all, &filter);
        let twice = apply_filter(&once, &filter);
        assert_eq!(once, twice);
        assert!(filter.is_active());
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let records = cities();
        assert_eq!(
            distinct_values(&records, Column::Name),
            vec!["paris", "Berlin", "Paris", "amsterdam", ""]
        );
        let mut more = records.clone();
        more.push(CityRecord::new("Lyon", "France", "Europe/Paris"));
        assert_eq!(
            distinct_values(&more, Column::Country),
            vec!["France", "Germany", "United States", "Netherlands", "Nowhere"]
        );
    }

    #[test]
    fn dropdowns_toggle_independently_and_close_together() {
        let mut dropdowns = Dropdowns::default();
        dropdowns.toggle(Column::Country);
        dropdowns.toggle(Column::Timezone);
        assert!(!dropdowns.is_open(Column::Name));
        assert!(dropdowns.is_open(Column::Country));
        assert_eq!(dropdowns.focused(), Some(Column::Country));

        dropdowns.toggle(Column::Country);
        assert_eq!(dropdowns.focused(), Some(Column::Timezone));

        dropdowns.close_all();
        assert_eq!(dropdowns.focused(), None);
    }
}
