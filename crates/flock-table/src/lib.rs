#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Flock Table
//!
//! List-management state for admin pages: one generic engine behind every
//! member, giving, asset and request listing.
//!
//! - **column** - Typed column descriptors with accessor closures
//! - **value** - Cell values with a total sort order
//! - **state** - Serializable table state and options
//! - **paginator** - Page bookkeeping
//! - **table** - Filter, sort and paginate engine with change listeners
//! - **search** - Search box binding with debouncing
//! - **export** - Export sink seam
//!
//! ## Example
//!
//! ```rust
//! use flock_table::prelude::*;
//!
//! struct Asset {
//!     tag: &'static str,
//!     room: &'static str,
//! }
//!
//! let columns = vec![
//!     Column::new("tag", "Tag", |a: &Asset| a.tag.into()),
//!     Column::new("room", "Room", |a: &Asset| a.room.into()),
//! ];
//! let rows = vec![
//!     Asset { tag: "PJ-01", room: "Sanctuary" },
//!     Asset { tag: "MX-04", room: "Fellowship Hall" },
//! ];
//!
//! let mut table = Table::configure(columns, rows, TableOptions::new()).unwrap();
//! table.set_global_filter("hall");
//! assert_eq!(table.rows().len(), 1);
//! ```

pub mod column;
pub mod error;
pub mod export;
pub mod paginator;
pub mod search;
pub mod state;
pub mod table;
pub mod value;

pub use error::{ExportError, Result, TableError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::column::{Column, FilterKind};
    pub use crate::error::{ExportError, TableError};
    pub use crate::export::{ExportSink, render_cells};
    pub use crate::paginator::Paginator;
    pub use crate::search::{DEFAULT_DEBOUNCE, DebouncedSearch, SearchBinding, SearchMode, bind_search};
    pub use crate::state::{
        ColumnFilter, ColumnSort, RowCount, SortDirection, Strictness, TableOptions, TableState,
    };
    pub use crate::table::{ListenerId, Table, TableEvent, TableListener};
    pub use crate::value::Value;
}
