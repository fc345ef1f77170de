//! Column descriptors for typed rows.
//!
//! A [`Column`] maps a row of type `T` to a [`Value`] through an accessor
//! closure. The table never looks at row fields directly.
//!
//! # Example
//!
//! ```rust
//! use flock_table::column::{Column, FilterKind};
//!
//! struct Member {
//!     name: String,
//!     status: String,
//! }
//!
//! let columns: Vec<Column<Member>> = vec![
//!     Column::new("name", "Name", |m: &Member| m.name.as_str().into()),
//!     Column::new("status", "Status", |m: &Member| m.status.as_str().into())
//!         .filter_kind(FilterKind::Exact),
//! ];
//! assert_eq!(columns[1].key(), "status");
//! ```

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Extracts a value from a row.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Renders a row's cell for display.
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// How a per-column filter value is matched against a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// The whole cell must equal the filter value (case-insensitive).
    Exact,
    /// The cell must contain the filter value (case-insensitive).
    #[default]
    Substring,
}

/// A column definition.
pub struct Column<T> {
    key: String,
    header: String,
    accessor: Accessor<T>,
    cell: Option<CellRenderer<T>>,
    sortable: bool,
    filterable: bool,
    hidden: bool,
    filter_kind: FilterKind,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            cell: self.cell.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            hidden: self.hidden,
            filter_kind: self.filter_kind,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("cell", &self.cell.as_ref().map(|_| "<renderer>"))
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("hidden", &self.hidden)
            .field("filter_kind", &self.filter_kind)
            .finish_non_exhaustive()
    }
}

impl<T> Column<T> {
    /// Creates a sortable, filterable, visible column.
    pub fn new<F>(key: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            cell: None,
            sortable: true,
            filterable: true,
            hidden: false,
            filter_kind: FilterKind::default(),
        }
    }

    /// Sets whether the column can be sorted (builder pattern).
    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sets whether the column takes part in filtering (builder pattern).
    #[must_use]
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets whether the column starts hidden (builder pattern).
    #[must_use]
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the per-column filter matching mode (builder pattern).
    #[must_use]
    pub fn filter_kind(mut self, kind: FilterKind) -> Self {
        self.filter_kind = kind;
        self
    }

    /// Sets a custom cell renderer (builder pattern).
    #[must_use]
    pub fn cell<F>(mut self, render: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(render));
        self
    }

    /// Returns the column key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the header text.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Returns whether the column can be sorted.
    #[must_use]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns whether the column takes part in filtering.
    #[must_use]
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Returns whether the column starts hidden.
    #[must_use]
    pub fn is_hidden_by_default(&self) -> bool {
        self.hidden
    }

    /// Returns the filter matching mode.
    #[must_use]
    pub fn get_filter_kind(&self) -> FilterKind {
        self.filter_kind
    }

    /// Extracts this column's value from a row.
    pub fn value(&self, row: &T) -> Value {
        (self.accessor)(row)
    }

    /// Renders this column's cell for a row.
    ///
    /// Uses the custom renderer when set, otherwise the value's display form.
    pub fn render(&self, row: &T) -> String {
        match &self.cell {
            Some(render) => render(row),
            None => self.value(row).to_string(),
        }
    }

    /// Tests a row against an already-lowercased filter needle.
    pub(crate) fn matches_filter(&self, row: &T, needle: &str) -> bool {
        let haystack = self.value(row).to_search_string();
        match self.filter_kind {
            FilterKind::Exact => haystack == needle,
            FilterKind::Substring => haystack.contains(needle),
        }
    }
}
