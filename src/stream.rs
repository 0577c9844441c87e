//! Entry points feeding text into a parse session
//!
//! - [`parse_string`]: one-shot, synchronous
//! - [`PushParser`]: event sink driven by a producer (`on_data` / `on_end` / `on_error`)
//! - [`parse_stream`]: pumps a [`Read`] source through a [`PushParser`]
//!
//! Source I/O errors are never wrapped: the source's `io::Error` reaches the
//! end callback, never the row callback.

use crate::dsv::{flush, ParseState, Parser};
use crate::error::Result;
use crate::types::{ParseOptions, Row};
use std::io::{ErrorKind, Read};
use std::marker::PhantomData;

/// Bytes requested from the source per read
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Parse a complete string, emitting each row to `on_row`
///
/// A missing final line break is supplied, so the last row is emitted even
/// without one. Empty input emits nothing. Fails only on invalid options.
///
/// # Examples
///
/// ```
/// use dsvstream::{parse_string, ParseOptions};
///
/// let mut rows = Vec::new();
/// parse_string("a,\"b,\",c\nd,e", &ParseOptions::default(), |row| rows.push(row))?;
///
/// assert_eq!(rows, vec![vec!["a", "b,", "c"], vec!["d", "e", ""]]);
/// # Ok::<(), dsvstream::DsvError>(())
/// ```
pub fn parse_string<F>(text: &str, options: &ParseOptions, mut on_row: F) -> Result<()>
where
    F: FnMut(Row),
{
    options.validate()?;

    let mut state = ParseState::with_buffer(text);
    flush(&mut state, options, &mut on_row);

    tracing::debug!(
        rows = state.rows_emitted(),
        bytes = text.len(),
        "parsed string"
    );
    Ok(())
}

/// Parse a complete string into a vector of rows
pub fn parse_to_rows(text: &str, options: &ParseOptions) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    parse_string(text, options, |row| rows.push(row))?;
    Ok(rows)
}

/// Push-driven parse session
///
/// A producer reports chunk arrivals with [`on_data`](Self::on_data) and
/// closes the session with either [`on_end`](Self::on_end) or
/// [`on_error`](Self::on_error). Both consume the sink, so nothing is parsed
/// after the session ends and the end callback runs exactly once.
///
/// # Examples
///
/// ```
/// use dsvstream::{ParseOptions, PushParser};
/// use std::io;
///
/// let mut rows = Vec::new();
/// let mut ended = false;
/// let mut sink = PushParser::new(
///     ParseOptions::default(),
///     |row| rows.push(row),
///     |err: Option<io::Error>| ended = err.is_none(),
/// )?;
///
/// sink.on_data(b"id,na");
/// sink.on_data(b"me\n1,x");
/// sink.on_end();
///
/// assert!(ended);
/// assert_eq!(rows, vec![vec!["id", "name"], vec!["1", "x"]]);
/// # Ok::<(), dsvstream::DsvError>(())
/// ```
pub struct PushParser<R, E, Err>
where
    R: FnMut(Row),
    E: FnOnce(Option<Err>),
{
    parser: Parser,
    on_row: R,
    on_end: E,
    _error: PhantomData<fn(Err)>,
}

impl<R, E, Err> PushParser<R, E, Err>
where
    R: FnMut(Row),
    E: FnOnce(Option<Err>),
{
    /// Create a sink with a row callback and an end callback
    pub fn new(options: ParseOptions, on_row: R, on_end: E) -> Result<Self> {
        Ok(PushParser {
            parser: Parser::with_options(options)?,
            on_row,
            on_end,
            _error: PhantomData,
        })
    }

    /// A chunk arrived from the source
    ///
    /// The chunk is decoded and buffered; rows it completes are emitted
    /// before this returns.
    pub fn on_data(&mut self, chunk: impl AsRef<[u8]>) {
        self.parser.push_bytes(chunk.as_ref(), &mut self.on_row);
    }

    /// The source ended: flush the remainder and report success
    ///
    /// Returns the number of rows emitted over the session.
    pub fn on_end(self) -> u64 {
        let PushParser {
            parser,
            mut on_row,
            on_end,
            ..
        } = self;

        let total = parser.finish(&mut on_row);
        tracing::debug!(rows = total, "stream finished");
        on_end(None);
        total
    }

    /// The source failed: report the error without parsing further
    ///
    /// Text still buffered is discarded.
    pub fn on_error(self, err: Err) {
        tracing::debug!(
            pending = self.parser.pending().len(),
            rows = self.parser.rows_emitted(),
            "stream failed"
        );
        (self.on_end)(Some(err));
    }

    /// Number of rows emitted so far
    pub fn rows_emitted(&self) -> u64 {
        self.parser.rows_emitted()
    }
}

/// Parse a byte source chunk by chunk
///
/// Every successful read is delivered as a chunk event to a [`PushParser`].
/// At end of source the remainder is flushed and `on_end(None)` is called; a
/// read error is passed to `on_end(Some(err))` as-is and parsing stops.
/// `ErrorKind::Interrupted` reads are retried.
///
/// The source is handed back so the caller can keep using or close it. The
/// returned error is only ever an options error, raised before any read.
///
/// # Examples
///
/// ```
/// use dsvstream::{parse_stream, ParseOptions};
///
/// let input: &[u8] = b"a;b\nc;d\n";
/// let mut rows = Vec::new();
/// let mut failure = None;
///
/// parse_stream(
///     input,
///     &ParseOptions::default().delimiter(';'),
///     |row| rows.push(row),
///     |err| failure = err,
/// )?;
///
/// assert!(failure.is_none());
/// assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
/// # Ok::<(), dsvstream::DsvError>(())
/// ```
pub fn parse_stream<S, R, E>(mut source: S, options: &ParseOptions, on_row: R, on_end: E) -> Result<S>
where
    S: Read,
    R: FnMut(Row),
    E: FnOnce(Option<std::io::Error>),
{
    let mut sink = PushParser::new(*options, on_row, on_end)?;
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        match source.read(&mut chunk) {
            Ok(0) => {
                sink.on_end();
                break;
            }
            Ok(n) => sink.on_data(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                sink.on_error(e);
                break;
            }
        }
    }

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DsvError;
    use std::io;

    /// Yields fixed chunks, then optionally fails
    struct ChunkedSource {
        chunks: Vec<Vec<u8>>,
        fail_at_end: bool,
    }

    impl Read for ChunkedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return if self.fail_at_end {
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
                } else {
                    Ok(0)
                };
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    fn source(chunks: &[&str], fail_at_end: bool) -> ChunkedSource {
        ChunkedSource {
            chunks: chunks.iter().map(|c| c.as_bytes().to_vec()).collect(),
            fail_at_end,
        }
    }

    #[test]
    fn test_parse_string_examples() -> Result<()> {
        let opts = ParseOptions::default();
        assert_eq!(
            parse_to_rows("a,b,c\nd,e,f\n", &opts)?,
            vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]
        );
        assert_eq!(parse_to_rows("a,\"b\"\"\",c\n", &opts)?, vec![vec!["a", "b\"", "c"]]);
        assert_eq!(parse_to_rows("a,b,c", &opts)?, vec![vec!["a", "b", "c"]]);
        Ok(())
    }

    #[test]
    fn test_parse_string_invalid_options() {
        let opts = ParseOptions::default().enclosing(',');
        let result = parse_string("a,b\n", &opts, |_| panic!("no rows expected"));
        assert!(matches!(result, Err(DsvError::InvalidOptions(_))));
    }

    #[test]
    fn test_stream_matches_string() -> Result<()> {
        let text = "x,\"y\"\"z\",w\r\n1,\"2\n3\",4\n5,6";
        let expected = parse_to_rows(text, &ParseOptions::default())?;

        let mut rows = Vec::new();
        let mut ended = false;
        parse_stream(
            source(&["x,\"y\"", "\"z\",w\r", "\n1,\"2\n", "3\",4\n5", ",6"], false),
            &ParseOptions::default(),
            |row| rows.push(row),
            |err| ended = err.is_none(),
        )?;

        assert!(ended);
        assert_eq!(rows, expected);
        Ok(())
    }

    #[test]
    fn test_stream_error_goes_to_end_callback() -> Result<()> {
        let mut rows = Vec::new();
        let mut failure = None;
        parse_stream(
            source(&["a,b\nc,"], true),
            &ParseOptions::default(),
            |row| rows.push(row),
            |err| failure = err,
        )?;

        // Complete rows before the failure are delivered, the partial one is not
        assert_eq!(rows, vec![vec!["a", "b"]]);
        let err = failure.expect("error should be reported");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(err.to_string(), "peer went away");
        Ok(())
    }

    #[test]
    fn test_stream_returns_source() -> Result<()> {
        let src = parse_stream(
            source(&["a\n"], false),
            &ParseOptions::default(),
            |_| {},
            |_| {},
        )?;
        assert!(src.chunks.is_empty());
        Ok(())
    }

    #[test]
    fn test_push_parser_counts_rows() -> Result<()> {
        let mut count = 0;
        let mut sink = PushParser::new(
            ParseOptions::tsv(),
            |_| count += 1,
            |_: Option<io::Error>| {},
        )?;
        sink.on_data("a\tb\n");
        assert_eq!(sink.rows_emitted(), 1);
        sink.on_data("c\td");
        assert_eq!(sink.on_end(), 2);
        assert_eq!(count, 2);
        Ok(())
    }

    #[test]
    fn test_empty_stream() -> Result<()> {
        let mut rows: Vec<Row> = Vec::new();
        let mut ended = false;
        parse_stream(
            source(&[], false),
            &ParseOptions::default(),
            |row| rows.push(row),
            |err| ended = err.is_none(),
        )?;
        assert!(ended);
        assert!(rows.is_empty());
        Ok(())
    }
}
