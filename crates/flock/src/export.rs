//! CSV export sink.

use flock_table::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes exports as CSV: a header row, then one record per row.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    written: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
            written: 0,
        }
    }

    /// Rows written by the last export.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> Result<W, ExportError> {
        self.writer
            .into_inner()
            .map_err(|err| ExportError::io(err.error().to_string()))
    }
}

impl CsvSink<File> {
    /// Creates a sink writing to a new file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<T, W: Write> ExportSink<T> for CsvSink<W> {
    fn export(&mut self, rows: &[&T], columns: &[&Column<T>]) -> Result<(), ExportError> {
        let (headers, cells) = render_cells(rows, columns);
        self.writer.write_record(&headers).map_err(csv_error)?;
        for record in &cells {
            self.writer.write_record(record).map_err(csv_error)?;
        }
        self.writer.flush()?;
        self.written = cells.len();
        Ok(())
    }
}

fn csv_error(err: csv::Error) -> ExportError {
    ExportError::sink(err.to_string())
}
