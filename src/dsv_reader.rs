//! Pull-style row reading from any byte source

use crate::dsv::Parser;
use crate::error::{DsvError, Result};
use crate::stream::CHUNK_SIZE;
use crate::types::{ParseOptions, Row};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Row reader over a byte source
///
/// Reads the source in fixed-size chunks and hands out rows one at a time.
/// Quoted fields may span lines and chunk boundaries. Memory usage is bound
/// by the chunk size plus the longest row.
///
/// # Examples
///
/// ```no_run
/// use dsvstream::dsv_reader::DsvReader;
///
/// let mut reader = DsvReader::open("data.csv").unwrap();
///
/// for row_result in reader.rows() {
///     let row = row_result.unwrap();
///     println!("{:?}", row);
/// }
/// ```
///
/// # With Headers
///
/// ```
/// use dsvstream::dsv_reader::DsvReader;
///
/// let input: &[u8] = b"id;name\n1;Alice\n";
/// let mut reader = DsvReader::new(input).delimiter(';').has_header(true);
///
/// let rows: Vec<_> = reader.rows().collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows, vec![vec!["1", "Alice"]]);
/// assert_eq!(reader.headers(), Some(&["id".to_string(), "name".to_string()][..]));
/// ```
pub struct DsvReader<R: Read> {
    source: R,
    parser: Option<Parser>,
    ready: VecDeque<Row>,
    chunk: Vec<u8>,
    finished: bool,

    // Configuration
    options: ParseOptions,
    has_header: bool,
    headers: Vec<String>,
    row_count: u64,
}

impl DsvReader<File> {
    /// Open a delimited text file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| DsvError::ReadError(format!("Failed to open file: {}", e)))?;
        Ok(DsvReader::new(file))
    }
}

impl<R: Read> DsvReader<R> {
    /// Create a reader over `source` with default options
    pub fn new(source: R) -> Self {
        DsvReader {
            source,
            parser: None,
            ready: VecDeque::new(),
            chunk: vec![0u8; CHUNK_SIZE],
            finished: false,
            options: ParseOptions::default(),
            has_header: false,
            headers: Vec::new(),
            row_count: 0,
        }
    }

    /// Set custom delimiter (builder pattern)
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.options.delimiter = delimiter;
        self
    }

    /// Set custom enclosing character (builder pattern)
    pub fn enclosing(mut self, enclosing: char) -> Self {
        self.options.enclosing = enclosing;
        self
    }

    /// Replace all parse options (builder pattern)
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Indicate that the first row contains headers (builder pattern)
    ///
    /// The header row is stored, accessible via `headers()`, and never
    /// returned by `read_row()`.
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    /// Get header row if one has been read
    pub fn headers(&self) -> Option<&[String]> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }

    /// Read the next data row
    ///
    /// Returns `Ok(None)` at end of input. Invalid options surface on the
    /// first call.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        if self.has_header && self.row_count == 0 {
            match self.next_row()? {
                Some(headers) => {
                    self.headers = headers;
                    self.row_count += 1;
                }
                None => return Ok(None),
            }
        }

        let row = self.next_row()?;
        if row.is_some() {
            self.row_count += 1;
        }
        Ok(row)
    }

    /// Get iterator over data rows
    pub fn rows(&mut self) -> DsvRowIterator<'_, R> {
        DsvRowIterator { reader: self }
    }

    /// Number of rows read so far, header included
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some(row) = self.ready.pop_front() {
                return Ok(Some(row));
            }
            if self.finished {
                return Ok(None);
            }
            if self.parser.is_none() {
                self.parser = Some(Parser::with_options(self.options)?);
            }

            let n = loop {
                match self.source.read(&mut self.chunk) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        return Err(DsvError::ReadError(format!("Failed to read chunk: {}", e)))
                    }
                }
            };

            let ready = &mut self.ready;
            if n == 0 {
                self.finished = true;
                if let Some(parser) = self.parser.take() {
                    parser.finish(|row| ready.push_back(row));
                }
            } else if let Some(parser) = self.parser.as_mut() {
                parser.push_bytes(&self.chunk[..n], |row| ready.push_back(row));
            }
        }
    }
}

/// Iterator over data rows
pub struct DsvRowIterator<'a, R: Read> {
    reader: &'a mut DsvReader<R>,
}

impl<'a, R: Read> Iterator for DsvRowIterator<'a, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_row().transpose()
    }
}
