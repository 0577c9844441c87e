//! Row writing to any byte sink

use crate::dsv::DsvEncoder;
use crate::error::{DsvError, Result};
use crate::types::{FormatOptions, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Delimited text writer
///
/// Encodes rows one at a time into a reusable buffer and streams them to
/// the sink, so memory usage stays constant regardless of row count. Each
/// row is followed by the line ending (`\n` by default).
///
/// # Examples
///
/// ```no_run
/// use dsvstream::dsv_writer::DsvWriter;
///
/// let mut writer = DsvWriter::create("output.csv").unwrap();
/// writer.write_row(["Name", "Age", "City"]).unwrap();
/// writer.write_row(["Alice", "30", "NYC"]).unwrap();
/// writer.save().unwrap();
/// ```
pub struct DsvWriter<W: Write> {
    writer: W,

    // State
    row_count: u64,
    buffer: String,

    // Configuration
    options: FormatOptions,
    line_ending: &'static str,
}

impl DsvWriter<BufWriter<File>> {
    /// Create (or truncate) a file and write to it
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())
            .map_err(|e| DsvError::WriteError(format!("Failed to create file: {}", e)))?;
        Ok(DsvWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> DsvWriter<W> {
    /// Create a writer over `writer` with default options
    pub fn new(writer: W) -> Self {
        DsvWriter {
            writer,
            row_count: 0,
            buffer: String::with_capacity(4096),
            options: FormatOptions::default(),
            line_ending: "\n",
        }
    }

    /// Set custom delimiter (builder pattern)
    ///
    /// # Examples
    ///
    /// ```
    /// use dsvstream::dsv_writer::DsvWriter;
    ///
    /// let mut writer = DsvWriter::new(Vec::new()).delimiter(';');
    /// writer.write_row(["a", "b;c"]).unwrap();
    /// let bytes = writer.save().unwrap();
    /// assert_eq!(bytes, b"a;\"b;c\"\n");
    /// ```
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    /// Set custom enclosing character (builder pattern)
    pub fn enclosing(mut self, enclosing: char) -> Self {
        self.options.enclosing = enclosing;
        self
    }

    /// Set the line ending written after each row (builder pattern)
    pub fn line_ending(mut self, line_ending: &'static str) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Write a row of strings
    pub fn write_row<I, S>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.buffer.clear();
        DsvEncoder::new(self.options).encode_fields(data, &mut self.buffer);
        self.flush_row()
    }

    /// Write a row of typed values
    ///
    /// # Examples
    ///
    /// ```
    /// use dsvstream::dsv_writer::DsvWriter;
    /// use dsvstream::Value;
    ///
    /// let mut writer = DsvWriter::new(Vec::new());
    /// writer.write_row_typed(&[
    ///     Value::from("Alice"),
    ///     Value::Int(30),
    ///     Value::Null,
    /// ]).unwrap();
    /// assert_eq!(writer.save().unwrap(), b"Alice,30,NULL\n");
    /// ```
    pub fn write_row_typed(&mut self, cells: &[Value]) -> Result<()> {
        self.buffer.clear();
        DsvEncoder::new(self.options).encode_row(cells, &mut self.buffer);
        self.flush_row()
    }

    /// Write multiple rows at once
    pub fn write_rows_batch<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row_data in rows {
            self.write_row(row_data)?;
        }
        Ok(())
    }

    /// Get the number of rows written
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Flush and give back the underlying sink
    pub fn save(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| DsvError::WriteError(format!("Failed to flush output: {}", e)))?;
        tracing::debug!(rows = self.row_count, "writer saved");
        Ok(self.writer)
    }

    fn flush_row(&mut self) -> Result<()> {
        self.buffer.push_str(self.line_ending);
        self.writer
            .write_all(self.buffer.as_bytes())
            .map_err(|e| DsvError::WriteError(format!("Failed to write row: {}", e)))?;
        self.row_count += 1;
        Ok(())
    }
}
