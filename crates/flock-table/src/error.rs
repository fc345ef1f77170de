//! Error types for table configuration and export.

use thiserror::Error;

/// Errors raised by table configuration and state setters.
///
/// Every variant describes a programmer error: a column key or page size the
/// caller never declared. Whether these surface as `Err` or are logged and
/// ignored depends on the table's [`Strictness`](crate::state::Strictness).
///
/// # Example
///
/// ```rust
/// use flock_table::TableError;
///
/// let err = TableError::UnknownColumn("email".into());
/// assert_eq!(err.to_string(), "unknown column: email");
/// assert!(err.is_column_error());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A setter referenced a column key that is not part of the column set.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Two columns in the same set share a key.
    #[error("duplicate column key: {0}")]
    DuplicateColumn(String),

    /// Sorting was requested on a column declared as not sortable.
    #[error("column is not sortable: {0}")]
    NotSortable(String),

    /// Filtering was requested on a column declared as not filterable.
    #[error("column is not filterable: {0}")]
    NotFilterable(String),

    /// A page size outside the declared options was requested.
    #[error("page size {size} is not one of {options:?}")]
    InvalidPageSize {
        /// The requested page size.
        size: usize,
        /// The declared page size options.
        options: Vec<usize>,
    },

    /// The table was configured without any page size options.
    #[error("no page size options declared")]
    NoPageSizeOptions,
}

impl TableError {
    /// Returns true if the error names a column key.
    #[must_use]
    pub fn is_column_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownColumn(_)
                | Self::DuplicateColumn(_)
                | Self::NotSortable(_)
                | Self::NotFilterable(_)
        )
    }

    /// Returns the column key the error refers to, if any.
    #[must_use]
    pub fn column_key(&self) -> Option<&str> {
        match self {
            Self::UnknownColumn(key)
            | Self::DuplicateColumn(key)
            | Self::NotSortable(key)
            | Self::NotFilterable(key) => Some(key),
            Self::InvalidPageSize { .. } | Self::NoPageSizeOptions => None,
        }
    }
}

/// A specialized [`Result`] type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors reported by an [`ExportSink`](crate::export::ExportSink).
///
/// The table never serializes rows itself, so these come from the sink.
/// Messages are stored as strings to keep the type `Clone` and `PartialEq`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The sink rejected or failed to write the rows.
    #[error("export failed: {0}")]
    Sink(String),

    /// An IO error while writing the export target.
    #[error("io error: {0}")]
    Io(String),
}

impl ExportError {
    /// Creates a sink error with the given message.
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink(message.into())
    }

    /// Creates an IO error with the given message.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_key() {
        assert_eq!(
            TableError::NotSortable("notes".into()).column_key(),
            Some("notes")
        );
        assert_eq!(TableError::NoPageSizeOptions.column_key(), None);
    }

    #[test]
    fn test_invalid_page_size_display() {
        let err = TableError::InvalidPageSize {
            size: 7,
            options: vec![10, 20],
        };
        assert_eq!(err.to_string(), "page size 7 is not one of [10, 20]");
        assert!(!err.is_column_error());
    }

    #[test]
    fn test_export_error_from_io() {
        let io = std::io::Error::other("disk full");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(ref m) if m.contains("disk full")));
    }
}
