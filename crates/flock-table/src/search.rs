//! Search box binding.
//!
//! A [`SearchBinding`] turns search text into either a per-column filter or
//! the table's global filter. [`DebouncedSearch`] holds keystrokes until the
//! input has been quiet for a short period, so the pipeline is not re-run on
//! every key press.
//!
//! Time is passed in by the caller, which keeps the debouncer a plain state
//! machine that can be driven from any event loop (or a test).
//!
//! # Example
//!
//! ```rust
//! use flock_table::prelude::*;
//! use std::time::{Duration, Instant};
//!
//! let columns = vec![Column::new("name", "Name", |s: &String| s.as_str().into())];
//! let rows = vec!["Miriam".to_string(), "Aaron".to_string()];
//! let mut table = Table::configure(columns, rows, TableOptions::new()).unwrap();
//!
//! let binding = bind_search(&table, SearchMode::Global).unwrap();
//! let mut search = DebouncedSearch::new(binding);
//!
//! let t0 = Instant::now();
//! search.input("mir", t0);
//! assert!(!search.poll(&mut table, t0).unwrap());
//! assert!(search.poll(&mut table, t0 + Duration::from_millis(200)).unwrap());
//! assert_eq!(table.row_count().filtered, 1);
//! ```

use crate::error::Result;
use crate::table::Table;
use std::time::{Duration, Instant};
use tracing::trace;

/// Default quiet period before search text is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Where search text is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// Filter a single column.
    Column(String),
    /// Filter across all filterable columns.
    Global,
}

/// A validated link between a search box and a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBinding {
    mode: SearchMode,
}

/// Binds a search box to a table.
///
/// # Errors
///
/// In column mode, an unknown or non-filterable column is rejected according
/// to the table's strictness. A lenient table still returns a binding; its
/// searches are then ignored by the table.
pub fn bind_search<T>(table: &Table<T>, mode: SearchMode) -> Result<SearchBinding> {
    if let SearchMode::Column(key) = &mode {
        if let Err(err) = table.check_filterable(key) {
            table.reject(err)?;
        }
    }
    Ok(SearchBinding { mode })
}

impl SearchBinding {
    /// Returns the binding mode.
    #[must_use]
    pub fn mode(&self) -> &SearchMode {
        &self.mode
    }

    /// Applies search text to the table right away.
    ///
    /// # Errors
    ///
    /// Propagates the table's rejection of the bound column.
    pub fn apply<T>(&self, table: &mut Table<T>, text: &str) -> Result<()> {
        match &self.mode {
            SearchMode::Column(key) => table.set_column_filter(key, text),
            SearchMode::Global => {
                table.set_global_filter(text);
                Ok(())
            }
        }
    }
}

/// Debounces search input before applying it to a table.
#[derive(Debug, Clone)]
pub struct DebouncedSearch {
    binding: SearchBinding,
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl DebouncedSearch {
    /// Wraps a binding with the default quiet period.
    #[must_use]
    pub fn new(binding: SearchBinding) -> Self {
        Self {
            binding,
            delay: DEFAULT_DEBOUNCE,
            pending: None,
        }
    }

    /// Sets the quiet period (builder pattern).
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the quiet period.
    #[must_use]
    pub fn get_delay(&self) -> Duration {
        self.delay
    }

    /// Returns the underlying binding.
    #[must_use]
    pub fn binding(&self) -> &SearchBinding {
        &self.binding
    }

    /// Records new search text; restarts the quiet period.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        trace!(search.text = %text, "Search input");
        self.pending = Some((text, now + self.delay));
    }

    /// Returns whether text is waiting to be applied.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns when the pending text becomes due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Applies the pending text if its quiet period has passed.
    ///
    /// Returns true if the table was updated.
    ///
    /// # Errors
    ///
    /// Propagates the table's rejection of the bound column.
    pub fn poll<T>(&mut self, table: &mut Table<T>, now: Instant) -> Result<bool> {
        if self.deadline().is_some_and(|due| due <= now) {
            self.flush(table)
        } else {
            Ok(false)
        }
    }

    /// Applies the pending text immediately (e.g. on Enter).
    ///
    /// Returns true if there was text to apply.
    ///
    /// # Errors
    ///
    /// Propagates the table's rejection of the bound column.
    pub fn flush<T>(&mut self, table: &mut Table<T>) -> Result<bool> {
        let Some((text, _)) = self.pending.take() else {
            return Ok(false);
        };
        self.binding.apply(table, &text)?;
        Ok(true)
    }

    /// Drops pending text without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl From<SearchBinding> for DebouncedSearch {
    fn from(binding: SearchBinding) -> Self {
        Self::new(binding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::error::TableError;
    use crate::state::{Strictness, TableOptions};

    #[derive(Debug)]
    struct Request {
        title: &'static str,
        category: &'static str,
    }

    fn table(strictness: Strictness) -> Table<Request> {
        let columns = vec![
            Column::new("title", "Title", |r: &Request| r.title.into()),
            Column::new("category", "Category", |r: &Request| r.category.into()),
            Column::new("secret", "Secret", |_: &Request| "x".into()).filterable(false),
        ];
        let rows = vec![
            Request { title: "Healing for Anna", category: "health" },
            Request { title: "New job", category: "work" },
            Request { title: "Travel mercies", category: "family" },
        ];
        Table::configure(columns, rows, TableOptions::new().strictness(strictness))
            .expect("valid table")
    }

    #[test]
    fn test_column_binding_delegates_to_column_filter() {
        let mut t = table(Strictness::Strict);
        let binding =
            bind_search(&t, SearchMode::Column("category".into())).expect("binding");
        binding.apply(&mut t, "work").expect("apply");
        assert_eq!(t.state().column_filter("category"), Some("work"));
        assert_eq!(t.row_count().filtered, 1);
        assert!(t.state().global_filter.is_empty());
    }

    #[test]
    fn test_global_binding_delegates_to_global_filter() {
        let mut t = table(Strictness::Strict);
        let binding = bind_search(&t, SearchMode::Global).expect("binding");
        binding.apply(&mut t, "ANNA").expect("apply");
        assert_eq!(t.state().global_filter, "ANNA");
        assert_eq!(t.row_count().filtered, 1);
    }

    #[test]
    fn test_bind_rejects_bad_column_when_strict() {
        let t = table(Strictness::Strict);
        assert_eq!(
            bind_search(&t, SearchMode::Column("missing".into())),
            Err(TableError::UnknownColumn("missing".into()))
        );
        assert_eq!(
            bind_search(&t, SearchMode::Column("secret".into())),
            Err(TableError::NotFilterable("secret".into()))
        );
    }

    #[test]
    fn test_lenient_binding_is_inert() {
        let mut t = table(Strictness::Lenient);
        let binding = bind_search(&t, SearchMode::Column("missing".into())).expect("binding");
        binding.apply(&mut t, "anything").expect("ignored");
        assert_eq!(t.row_count().filtered, 3);
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut t = table(Strictness::Strict);
        let binding = bind_search(&t, SearchMode::Global).expect("binding");
        let mut search = DebouncedSearch::new(binding);
        let t0 = Instant::now();

        search.input("j", t0);
        search.input("jo", t0 + Duration::from_millis(100));
        search.input("job", t0 + Duration::from_millis(200));

        // 150ms after the first key, but only 50ms after the last
        assert!(!search.poll(&mut t, t0 + Duration::from_millis(250)).expect("poll"));
        assert!(t.state().global_filter.is_empty());

        assert!(search.poll(&mut t, t0 + Duration::from_millis(350)).expect("poll"));
        assert_eq!(t.state().global_filter, "job");
        assert!(!search.is_pending());

        // nothing left to apply
        assert!(!search.poll(&mut t, t0 + Duration::from_secs(5)).expect("poll"));
    }

    #[test]
    fn test_flush_and_cancel() {
        let mut t = table(Strictness::Strict);
        let binding = bind_search(&t, SearchMode::Global).expect("binding");
        let mut search = DebouncedSearch::from(binding).delay(Duration::from_secs(1));
        let t0 = Instant::now();

        search.input("travel", t0);
        assert_eq!(search.deadline(), Some(t0 + Duration::from_secs(1)));
        assert!(search.flush(&mut t).expect("flush"));
        assert_eq!(t.row_count().filtered, 1);

        search.input("nothing matches", t0);
        search.cancel();
        assert!(!search.flush(&mut t).expect("flush"));
        assert_eq!(t.row_count().filtered, 1);
    }
}
