//! Export seam.
//!
//! The table never serializes rows. [`Table::export`](crate::table::Table::export)
//! hands every filtered, sorted row (not just the current page) plus the
//! visible columns to an [`ExportSink`], which owns the output format.

use crate::column::Column;
use crate::error::ExportError;

/// Receives the rows and columns of an export.
pub trait ExportSink<T> {
    /// Consumes one export.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if the rows could not be written.
    fn export(&mut self, rows: &[&T], columns: &[&Column<T>]) -> Result<(), ExportError>;
}

impl<T, F> ExportSink<T> for F
where
    F: FnMut(&[&T], &[&Column<T>]) -> Result<(), ExportError>,
{
    fn export(&mut self, rows: &[&T], columns: &[&Column<T>]) -> Result<(), ExportError> {
        self(rows, columns)
    }
}

/// Renders rows into a header line plus one line of cells per row.
///
/// Sinks that write tabular formats can use this instead of calling
/// [`Column::render`] themselves.
#[must_use]
pub fn render_cells<T>(rows: &[&T], columns: &[&Column<T>]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = columns.iter().map(|c| c.header().to_string()).collect();
    let cells = rows
        .iter()
        .map(|row| columns.iter().map(|c| c.render(row)).collect())
        .collect();
    (headers, cells)
}
