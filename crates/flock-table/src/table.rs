//! Filter, sort and paginate engine over an in-memory row set.
//!
//! A [`Table`] owns the caller's rows, a column set and a [`TableState`].
//! Every setter re-runs the pipeline:
//!
//! 1. per-column filters (AND),
//! 2. global filter (case-insensitive substring over filterable columns),
//! 3. stable sort on the active sort column,
//! 4. page slice.
//!
//! The filtered and sorted order is cached as indices into the row vector,
//! so reading the current page never re-filters.
//!
//! # Example
//!
//! ```rust
//! use flock_table::prelude::*;
//!
//! #[derive(Debug)]
//! struct Member {
//!     name: &'static str,
//!     ministry: &'static str,
//! }
//!
//! let columns = vec![
//!     Column::new("name", "Name", |m: &Member| m.name.into()),
//!     Column::new("ministry", "Ministry", |m: &Member| m.ministry.into()),
//! ];
//! let rows = vec![
//!     Member { name: "Esther", ministry: "Choir" },
//!     Member { name: "Caleb", ministry: "Ushers" },
//!     Member { name: "Abigail", ministry: "Choir" },
//! ];
//!
//! let mut table = Table::configure(columns, rows, TableOptions::new()).unwrap();
//! table.set_column_filter("ministry", "choir").unwrap();
//! table.set_sort("name", Some(SortDirection::Asc)).unwrap();
//!
//! let names: Vec<_> = table.rows().iter().map(|m| m.name).collect();
//! assert_eq!(names, ["Abigail", "Esther"]);
//! assert_eq!(table.row_count(), RowCount { total: 3, filtered: 2 });
//! ```

use crate::column::Column;
use crate::error::{ExportError, Result, TableError};
use crate::export::ExportSink;
use crate::paginator::Paginator;
use crate::state::{
    ColumnFilter, ColumnSort, RowCount, SortDirection, Strictness, TableOptions, TableState,
};
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Identifier for a registered change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A state change that listeners are told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// The row set was replaced.
    RowsReplaced {
        /// New total row count.
        total: usize,
    },
    /// The active sort changed (`None` means unsorted).
    SortChanged(Option<ColumnSort>),
    /// A column filter was set; an empty value means it was cleared.
    ColumnFilterChanged {
        /// Column key.
        key: String,
        /// New filter value.
        value: String,
    },
    /// The global filter text changed.
    GlobalFilterChanged(String),
    /// All column filters and the global filter were cleared.
    FiltersCleared,
    /// The page index changed through navigation.
    PageChanged(usize),
    /// The page size changed.
    PageSizeChanged {
        /// New page size.
        page_size: usize,
        /// Page index after keeping the first visible row on screen.
        page_index: usize,
    },
    /// A column was shown or hidden.
    VisibilityChanged {
        /// Column key.
        key: String,
        /// Whether the column is now visible.
        visible: bool,
    },
    /// The state was restored to its configured initial value.
    Reset,
}

/// Listener callback for table changes.
pub trait TableListener: Send + Sync {
    /// Called after the state has changed and the pipeline has re-run.
    fn on_table_change(&self, event: &TableEvent);
}

impl<F> TableListener for F
where
    F: Fn(&TableEvent) + Send + Sync,
{
    fn on_table_change(&self, event: &TableEvent) {
        self(event);
    }
}

/// Filterable, sortable, paginated view over rows of type `T`.
pub struct Table<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    state: TableState,
    /// Sanitized initial state, restored by [`Table::reset`].
    initial: TableState,
    page_size_options: Vec<usize>,
    strictness: Strictness,
    paginator: Paginator,
    /// Indices into `rows` after filtering and sorting.
    processed: Vec<usize>,
    listeners: Vec<(ListenerId, Arc<dyn TableListener>)>,
    next_listener_id: u64,
    data_version: u64,
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("state", &self.state)
            .field("page_size_options", &self.page_size_options)
            .field("strictness", &self.strictness)
            .field("filtered", &self.processed.len())
            .field("listeners", &format!("{} listeners", self.listeners.len()))
            .field("data_version", &self.data_version)
            .finish_non_exhaustive()
    }
}

impl<T> Table<T> {
    /// Creates a table from columns, rows and options.
    ///
    /// # Errors
    ///
    /// Under [`Strictness::Strict`], returns an error for duplicate column
    /// keys, an empty page size list, or an initial state that references
    /// unknown columns or an undeclared page size. Under
    /// [`Strictness::Lenient`] those parts are dropped with a warning.
    pub fn configure(columns: Vec<Column<T>>, rows: Vec<T>, options: TableOptions) -> Result<Self> {
        let TableOptions {
            mut page_size_options,
            initial,
            strictness,
        } = options;

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(columns.len());
        for column in columns {
            if seen.insert(column.key().to_string()) {
                kept.push(column);
                continue;
            }
            let err = TableError::DuplicateColumn(column.key().to_string());
            match strictness {
                Strictness::Strict => return Err(err),
                Strictness::Lenient => warn!(error = %err, "dropping duplicate column"),
            }
        }

        page_size_options.retain(|&n| n > 0);
        page_size_options.sort_unstable();
        page_size_options.dedup();
        if page_size_options.is_empty() {
            match strictness {
                Strictness::Strict => return Err(TableError::NoPageSizeOptions),
                Strictness::Lenient => {
                    warn!(
                        table.page_size = initial.page_size,
                        "no page size options declared, using the initial page size"
                    );
                    page_size_options.push(initial.page_size.max(1));
                }
            }
        }

        let mut table = Self {
            columns: kept,
            rows,
            state: TableState::default(),
            initial: TableState::default(),
            page_size_options,
            strictness,
            paginator: Paginator::new(),
            processed: Vec::new(),
            listeners: Vec::new(),
            next_listener_id: 1,
            data_version: 0,
        };

        let initial = table.sanitize(initial)?;
        table.initial = initial.clone();
        table.load_state(initial);
        debug!(
            table.columns = table.columns.len(),
            table.rows = table.rows.len(),
            table.page_size = table.state.page_size,
            "Table configured"
        );
        Ok(table)
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    /// Returns the rows on the current page, filtered and sorted.
    #[must_use]
    pub fn rows(&self) -> Vec<&T> {
        let (start, end) = self.paginator.get_slice_bounds(self.processed.len());
        self.processed[start..end]
            .iter()
            .map(|&i| &self.rows[i])
            .collect()
    }

    /// Returns every row that passes the filters, sorted, across all pages.
    #[must_use]
    pub fn export_rows(&self) -> Vec<&T> {
        self.processed.iter().map(|&i| &self.rows[i]).collect()
    }

    /// Returns total and filtered row counts.
    #[must_use]
    pub fn row_count(&self) -> RowCount {
        RowCount {
            total: self.rows.len(),
            filtered: self.processed.len(),
        }
    }

    /// Returns all rows in their original order.
    #[must_use]
    pub fn all_rows(&self) -> &[T] {
        &self.rows
    }

    /// Returns the full column set in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Looks up a column by key.
    #[must_use]
    pub fn column(&self, key: &str) -> Option<&Column<T>> {
        self.columns.iter().find(|c| c.key() == key)
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Returns the current page index.
    #[must_use]
    pub fn page_index(&self) -> usize {
        self.state.page_index
    }

    /// Returns the current page size.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    /// Returns the number of pages; an empty table has one empty page.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.paginator.get_total_pages()
    }

    /// Returns the declared page sizes, sorted ascending.
    #[must_use]
    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// Returns the strictness the table was configured with.
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Returns a counter bumped on every state change.
    #[must_use]
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Returns whether the current page is the first.
    #[must_use]
    pub fn on_first_page(&self) -> bool {
        self.paginator.on_first_page()
    }

    /// Returns whether the current page is the last.
    #[must_use]
    pub fn on_last_page(&self) -> bool {
        self.paginator.on_last_page()
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sorts by a column, or removes that column's sort when `direction` is `None`.
    ///
    /// Only one sort is active at a time; setting a new one replaces it.
    ///
    /// # Errors
    ///
    /// Unknown or non-sortable columns are rejected according to strictness.
    pub fn set_sort(&mut self, key: &str, direction: Option<SortDirection>) -> Result<()> {
        if let Err(err) = self.check_sortable(key) {
            return self.reject(err);
        }
        match direction {
            Some(direction) => {
                self.state.sorting.clear();
                self.state.sorting.push(ColumnSort::new(key, direction));
            }
            None => self.state.sorting.retain(|s| s.key != key),
        }
        debug!(table.column = %key, table.direction = ?direction, "Sort changed");
        self.recompute();
        let active = self.state.active_sort().cloned();
        self.notify(&TableEvent::SortChanged(active));
        Ok(())
    }

    /// Cycles a column's sort: none, ascending, descending, none.
    ///
    /// # Errors
    ///
    /// Unknown or non-sortable columns are rejected according to strictness.
    pub fn toggle_sort(&mut self, key: &str) -> Result<()> {
        let next = match self.state.active_sort() {
            Some(sort) if sort.key == key => match sort.direction {
                SortDirection::Asc => Some(SortDirection::Desc),
                SortDirection::Desc => None,
            },
            _ => Some(SortDirection::Asc),
        };
        self.set_sort(key, next)
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Sets a per-column filter. An empty value clears it.
    ///
    /// # Errors
    ///
    /// Unknown or non-filterable columns are rejected according to strictness.
    pub fn set_column_filter(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if let Err(err) = self.check_filterable(key) {
            return self.reject(err);
        }
        let value = value.into();
        if value.is_empty() {
            self.state.column_filters.retain(|f| f.key != key);
        } else if let Some(existing) = self.state.column_filters.iter_mut().find(|f| f.key == key) {
            existing.value.clone_from(&value);
        } else {
            self.state
                .column_filters
                .push(ColumnFilter::new(key, value.clone()));
        }
        debug!(table.column = %key, table.filter = %value, "Column filter changed");
        self.recompute();
        self.notify(&TableEvent::ColumnFilterChanged {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    /// Sets the global free-text filter. An empty string clears it.
    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!(table.global_filter = %text, "Global filter changed");
        self.state.global_filter.clone_from(&text);
        self.recompute();
        self.notify(&TableEvent::GlobalFilterChanged(text));
    }

    /// Clears every column filter and the global filter.
    pub fn clear_filters(&mut self) {
        self.state.column_filters.clear();
        self.state.global_filter.clear();
        debug!("Filters cleared");
        self.recompute();
        self.notify(&TableEvent::FiltersCleared);
    }

    // -------------------------------------------------------------------------
    // Pagination
    // -------------------------------------------------------------------------

    /// Moves to a page, clamped to the last valid page.
    pub fn set_page(&mut self, index: usize) {
        self.paginator.set_page(index);
        self.sync_page();
        trace!(table.page_index = self.state.page_index, "Page changed");
        self.notify(&TableEvent::PageChanged(self.state.page_index));
    }

    /// Moves to the next page if there is one.
    pub fn next_page(&mut self) {
        self.set_page(self.paginator.page() + 1);
    }

    /// Moves to the previous page if there is one.
    pub fn prev_page(&mut self) {
        self.set_page(self.paginator.page().saturating_sub(1));
    }

    /// Changes the page size, keeping the first visible row on screen.
    ///
    /// # Errors
    ///
    /// Sizes outside the declared options are rejected according to strictness.
    pub fn set_page_size(&mut self, n: usize) -> Result<()> {
        if !self.page_size_options.contains(&n) {
            return self.reject(TableError::InvalidPageSize {
                size: n,
                options: self.page_size_options.clone(),
            });
        }
        self.paginator.set_per_page(n, self.processed.len());
        self.sync_page();
        debug!(
            table.page_size = n,
            table.page_index = self.state.page_index,
            "Page size changed"
        );
        self.notify(&TableEvent::PageSizeChanged {
            page_size: n,
            page_index: self.state.page_index,
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Visibility and export
    // -------------------------------------------------------------------------

    /// Shows or hides a column.
    ///
    /// # Errors
    ///
    /// Unknown columns are rejected according to strictness.
    pub fn toggle_column(&mut self, key: &str, visible: bool) -> Result<()> {
        if self.column(key).is_none() {
            return self.reject(TableError::UnknownColumn(key.to_string()));
        }
        self.state
            .column_visibility
            .insert(key.to_string(), visible);
        debug!(table.column = %key, table.visible = visible, "Column visibility changed");
        self.notify(&TableEvent::VisibilityChanged {
            key: key.to_string(),
            visible,
        });
        Ok(())
    }

    /// Returns whether a column is currently visible.
    #[must_use]
    pub fn is_column_visible(&self, key: &str) -> bool {
        self.column(key).is_some_and(|c| self.visible(c))
    }

    /// Returns the visible columns in declaration order.
    #[must_use]
    pub fn visible_columns(&self) -> Vec<&Column<T>> {
        self.columns.iter().filter(|c| self.visible(c)).collect()
    }

    /// Hands the filtered, sorted rows and visible columns to a sink.
    ///
    /// # Errors
    ///
    /// Returns whatever error the sink reports.
    pub fn export<S>(&self, sink: &mut S) -> std::result::Result<(), ExportError>
    where
        S: ExportSink<T> + ?Sized,
    {
        let rows = self.export_rows();
        let columns = self.visible_columns();
        debug!(
            table.export_rows = rows.len(),
            table.export_columns = columns.len(),
            "Exporting rows"
        );
        sink.export(&rows, &columns)
    }

    // -------------------------------------------------------------------------
    // Rows and lifecycle
    // -------------------------------------------------------------------------

    /// Replaces all rows; the state is kept and the page re-clamped.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        debug!(table.rows = self.rows.len(), "Rows replaced");
        self.recompute();
        self.notify(&TableEvent::RowsReplaced {
            total: self.rows.len(),
        });
    }

    /// Restores the state the table was configured with.
    pub fn reset(&mut self) {
        self.load_state(self.initial.clone());
        debug!("Table state reset");
        self.notify(&TableEvent::Reset);
    }

    /// Registers a change listener.
    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: TableListener + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        debug!(table.listener_id = id.0, "Table listener registered");
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        let removed = self.listeners.len() != before;
        if removed {
            debug!(table.listener_id = id.0, "Table listener removed");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Returns `Err` in strict mode, logs and swallows it in lenient mode.
    pub(crate) fn reject(&self, err: TableError) -> Result<()> {
        match self.strictness {
            Strictness::Strict => Err(err),
            Strictness::Lenient => {
                warn!(error = %err, "Ignoring invalid table operation");
                Ok(())
            }
        }
    }

    fn check_sortable(&self, key: &str) -> Result<()> {
        match self.column(key) {
            None => Err(TableError::UnknownColumn(key.to_string())),
            Some(c) if !c.is_sortable() => Err(TableError::NotSortable(key.to_string())),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn check_filterable(&self, key: &str) -> Result<()> {
        match self.column(key) {
            None => Err(TableError::UnknownColumn(key.to_string())),
            Some(c) if !c.is_filterable() => Err(TableError::NotFilterable(key.to_string())),
            Some(_) => Ok(()),
        }
    }

    fn visible(&self, column: &Column<T>) -> bool {
        self.state
            .column_visibility
            .get(column.key())
            .copied()
            .unwrap_or(!column.is_hidden_by_default())
    }

    /// Drops (or rejects) every part of a state that doesn't fit this table.
    fn sanitize(&self, state: TableState) -> Result<TableState> {
        let TableState {
            sorting,
            column_filters,
            global_filter,
            column_visibility,
            page_index,
            page_size,
        } = state;

        let mut clean = TableState {
            global_filter,
            page_index,
            ..TableState::default()
        };

        if let Some(sort) = sorting.into_iter().last() {
            match self.check_sortable(&sort.key) {
                Ok(()) => clean.sorting.push(sort),
                Err(err) => self.reject(err)?,
            }
        }
        for filter in column_filters {
            match self.check_filterable(&filter.key) {
                Ok(()) if filter.value.is_empty() => {}
                Ok(()) => {
                    clean.column_filters.retain(|f| f.key != filter.key);
                    clean.column_filters.push(filter);
                }
                Err(err) => self.reject(err)?,
            }
        }
        for (key, visible) in column_visibility {
            if self.column(&key).is_some() {
                clean.column_visibility.insert(key, visible);
            } else {
                self.reject(TableError::UnknownColumn(key))?;
            }
        }
        clean.page_size = if self.page_size_options.contains(&page_size) {
            page_size
        } else {
            self.reject(TableError::InvalidPageSize {
                size: page_size,
                options: self.page_size_options.clone(),
            })?;
            self.page_size_options[0]
        };
        Ok(clean)
    }

    /// Installs a sanitized state and re-runs the pipeline.
    fn load_state(&mut self, state: TableState) {
        let page_index = state.page_index;
        self.paginator = Paginator::new().per_page(state.page_size);
        self.state = state;
        self.recompute();
        self.paginator.set_page(page_index);
        self.sync_page();
    }

    fn sync_page(&mut self) {
        self.state.page_index = self.paginator.page();
        self.state.page_size = self.paginator.get_per_page();
    }

    /// Re-runs filter and sort, then re-clamps the page.
    fn recompute(&mut self) {
        let filters: Vec<(&Column<T>, String)> = self
            .state
            .column_filters
            .iter()
            .filter_map(|f| self.column(&f.key).map(|c| (c, f.value.to_lowercase())))
            .collect();
        let global = self.state.global_filter.to_lowercase();
        let searchable: Vec<&Column<T>> =
            self.columns.iter().filter(|c| c.is_filterable()).collect();

        let mut indices: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                filters
                    .iter()
                    .all(|(column, needle)| column.matches_filter(row, needle))
            })
            .filter(|(_, row)| {
                global.is_empty()
                    || searchable
                        .iter()
                        .any(|column| column.value(row).to_search_string().contains(&global))
            })
            .map(|(i, _)| i)
            .collect();

        if let Some(sort) = self.state.active_sort() {
            if let Some(column) = self.column(&sort.key) {
                let keys: Vec<Value> = indices.iter().map(|&i| column.value(&self.rows[i])).collect();
                let mut order: Vec<usize> = (0..indices.len()).collect();
                // `sort_by` is stable: equal keys keep their original row order.
                order.sort_by(|&a, &b| {
                    let ord = keys[a].compare(&keys[b]);
                    match sort.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                });
                indices = order.into_iter().map(|k| indices[k]).collect();
            }
        }

        trace!(
            table.total = self.rows.len(),
            table.filtered = indices.len(),
            "Pipeline recomputed"
        );
        self.processed = indices;
        self.paginator.set_total_pages_from_items(self.processed.len());
        self.sync_page();
    }

    fn notify(&mut self, event: &TableEvent) {
        self.data_version += 1;
        for (id, listener) in &self.listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener.on_table_change(event)));
            if result.is_err() {
                warn!(table.listener_id = id.0, event = ?event, "Table listener panicked");
            }
        }
    }
}
