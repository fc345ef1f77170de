//! Table state and configuration types.
//!
//! [`TableState`] is the full, serializable description of what a table is
//! showing: sort, filters, visibility and page. [`TableOptions`] declares the
//! allowed page sizes, the initial state and how strictly programmer errors
//! are treated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Parses "asc"/"ascending" or "desc"/"descending", ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// An active sort on one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSort {
    /// Column key.
    pub key: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl ColumnSort {
    /// Creates a sort entry.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// An active per-column filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column key.
    pub key: String,
    /// Filter text as entered by the user.
    pub value: String,
}

impl ColumnFilter {
    /// Creates a filter entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Complete view state of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    /// Sort entries; only the last one is applied.
    pub sorting: Vec<ColumnSort>,
    /// Per-column filters, combined with AND.
    pub column_filters: Vec<ColumnFilter>,
    /// Free-text filter across all filterable columns.
    pub global_filter: String,
    /// Explicit visibility overrides by column key.
    pub column_visibility: HashMap<String, bool>,
    /// Current page (0-indexed).
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            sorting: Vec::new(),
            column_filters: Vec::new(),
            global_filter: String::new(),
            column_visibility: HashMap::new(),
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableState {
    /// Returns the sort that is applied, if any.
    #[must_use]
    pub fn active_sort(&self) -> Option<&ColumnSort> {
        self.sorting.last()
    }

    /// Returns the filter value set on a column, if any.
    #[must_use]
    pub fn column_filter(&self, key: &str) -> Option<&str> {
        self.column_filters
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Returns true if any column filter or the global filter is set.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.column_filters.is_empty() || !self.global_filter.is_empty()
    }
}

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default page size choices offered to users.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

/// How the table reacts to programmer errors (unknown keys, bad page sizes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Return the error to the caller.
    Strict,
    /// Log a warning and leave the state unchanged.
    Lenient,
}

impl Default for Strictness {
    /// Strict in debug builds, lenient in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// Options passed to [`Table::configure`](crate::table::Table::configure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Allowed page sizes.
    pub page_size_options: Vec<usize>,
    /// State applied at configure time and restored by `reset`.
    pub initial: TableState,
    /// Programmer error handling.
    pub strictness: Strictness,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            initial: TableState::default(),
            strictness: Strictness::default(),
        }
    }
}

impl TableOptions {
    /// Creates options with default page sizes and an empty initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the allowed page sizes (builder pattern).
    #[must_use]
    pub fn page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    /// Sets the initial page size (builder pattern).
    #[must_use]
    pub fn page_size(mut self, n: usize) -> Self {
        self.initial.page_size = n;
        self
    }

    /// Sets the whole initial state (builder pattern).
    #[must_use]
    pub fn initial_state(mut self, state: TableState) -> Self {
        self.initial = state;
        self
    }

    /// Sets the strictness (builder pattern).
    #[must_use]
    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }
}

/// Row counts before and after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowCount {
    /// All rows supplied to the table.
    pub total: usize,
    /// Rows that pass the current filters.
    pub filtered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("ASC"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("descending"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("up"), None);
        assert_eq!(SortDirection::Asc.reverse(), SortDirection::Desc);
    }

    #[test]
    fn test_active_sort_is_last() {
        let state = TableState {
            sorting: vec![
                ColumnSort::new("name", SortDirection::Asc),
                ColumnSort::new("joined", SortDirection::Desc),
            ],
            ..TableState::default()
        };
        assert_eq!(state.active_sort().map(|s| s.key.as_str()), Some("joined"));
    }

    #[test]
    fn test_column_filter_lookup() {
        let state = TableState {
            column_filters: vec![ColumnFilter::new("status", "active")],
            ..TableState::default()
        };
        assert_eq!(state.column_filter("status"), Some("active"));
        assert_eq!(state.column_filter("name"), None);
        assert!(state.has_filters());
        assert!(!TableState::default().has_filters());
    }

    #[test]
    fn test_options_builder() {
        let options = TableOptions::new()
            .page_size_options(vec![5, 25])
            .page_size(25)
            .strictness(Strictness::Lenient);
        assert_eq!(options.page_size_options, vec![5, 25]);
        assert_eq!(options.initial.page_size, 25);
        assert_eq!(options.strictness, Strictness::Lenient);
    }

    #[test]
    fn test_state_deserializes_with_defaults() {
        let state: TableState =
            serde_json::from_str(r#"{"global_filter":"smith","page_size":20}"#)
                .expect("valid state json");
        assert_eq!(state.global_filter, "smith");
        assert_eq!(state.page_size, 20);
        assert_eq!(state.page_index, 0);
        assert!(state.sorting.is_empty());
    }

    #[test]
    fn test_options_from_toml() {
        let options: TableOptions = toml::from_str(
            r#"
            page_size_options = [5, 10]
            strictness = "lenient"

            [initial]
            page_size = 5
            sorting = [{ key = "name", direction = "desc" }]
            "#,
        )
        .expect("valid options toml");
        assert_eq!(options.page_size_options, vec![5, 10]);
        assert_eq!(options.strictness, Strictness::Lenient);
        assert_eq!(
            options.initial.active_sort(),
            Some(&ColumnSort::new("name", SortDirection::Desc))
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_strictness_default_in_debug() {
        assert_eq!(Strictness::default(), Strictness::Strict);
    }
}
