//! Resumable DSV parsing with RFC 4180-like quoting
//!
//! [`parse`] advances a [`ParseState`] over whatever text has been buffered
//! so far, emitting every complete row and leaving the trailing partial row
//! in the buffer. The scan position inside that partial row (column, field
//! so far, quote state) is kept in the state, so each byte is scanned once
//! and the rows produced do not depend on where the input was split.

use super::decoder::ChunkDecoder;
use crate::error::Result;
use crate::types::{ParseOptions, Row};

/// Working row plus the cached template used to reset it
#[derive(Debug, Default, Clone)]
struct RowBuilder {
    row: Row,
    template: Option<Row>,
    emitted: u64,
}

impl RowBuilder {
    fn store(&mut self, column: usize, value: String) {
        if column < self.row.len() {
            self.row[column] = value;
        } else {
            self.row.push(value);
        }
    }

    fn fresh_row(&mut self) -> Row {
        match &self.template {
            Some(template) => template.clone(),
            None => {
                // First row fixes the column count
                let template = vec![String::new(); self.row.len()];
                self.template = Some(template.clone());
                template
            }
        }
    }

    fn complete<F: FnMut(Row)>(&mut self, on_row: &mut F) {
        let fresh = self.fresh_row();
        let row = std::mem::replace(&mut self.row, fresh);
        self.emitted += 1;
        on_row(row);
    }
}

/// Position of the quoted scan inside the unfinished row
///
/// Fields before `column` are already stored in the working row.
#[derive(Debug, Default, Clone)]
struct Cursor {
    // Bytes of the buffer already scanned
    offset: usize,
    column: usize,
    field: String,
    in_quotes: bool,
    trailing_cr: bool,
}

impl Cursor {
    /// Nothing of the unfinished row has been scanned yet
    fn is_fresh(&self) -> bool {
        self.offset == 0
    }
}

/// Mutable state of one parse session
///
/// One `ParseState` belongs to exactly one input. Parsing independent inputs
/// in parallel requires one state per input.
#[derive(Debug, Default, Clone)]
pub struct ParseState {
    buffer: String,
    rows: RowBuilder,
    cursor: Cursor,
}

impl ParseState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state whose buffer already holds `text`
    pub fn with_buffer(text: impl Into<String>) -> Self {
        ParseState {
            buffer: text.into(),
            ..Self::default()
        }
    }

    /// Append text to the pending buffer
    pub fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Text received but not yet consumed into complete rows
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Column of the unfinished row the next step resumes in
    pub fn column_index(&self) -> usize {
        self.cursor.column
    }

    /// Empty row of the column count inferred from the first row
    pub fn row_template(&self) -> Option<&[String]> {
        self.rows.template.as_deref()
    }

    /// Number of rows emitted so far
    pub fn rows_emitted(&self) -> u64 {
        self.rows.emitted
    }
}

/// Consume every complete row in `state`'s buffer
///
/// Each row terminated by a `\n` outside a quoted run is handed to `on_row`
/// in input order. A trailing partial row is left in the buffer; the next
/// call resumes scanning where this one stopped. Malformed input never
/// fails: it produces best-effort rows.
///
/// # Examples
///
/// ```
/// use dsvstream::dsv::{parse, ParseState};
/// use dsvstream::ParseOptions;
///
/// let mut state = ParseState::with_buffer("a,b\nc,");
/// let mut rows = Vec::new();
/// parse(&mut state, &ParseOptions::default(), |row| rows.push(row));
///
/// assert_eq!(rows, vec![vec!["a", "b"]]);
/// assert_eq!(state.buffer(), "c,");
/// ```
pub fn parse<F>(state: &mut ParseState, options: &ParseOptions, mut on_row: F)
where
    F: FnMut(Row),
{
    let ParseState {
        buffer,
        rows,
        cursor,
    } = state;
    let quoted = !cursor.is_fresh() || buffer.contains(options.enclosing);

    let consumed = if quoted {
        scan_quoted(buffer, rows, cursor, options, false, &mut on_row)
    } else {
        scan_unquoted(buffer, rows, options, &mut on_row)
    };

    tracing::trace!(
        consumed,
        pending = buffer.len() - consumed,
        column = cursor.column,
        quoted,
        "parse step"
    );

    if consumed > 0 {
        buffer.replace_range(..consumed, "");
    }
}

/// Parse everything left in `state` as the end of the input
///
/// A missing final line break is supplied. An unterminated quoted run is
/// absorbed into the last field of the final row.
pub fn flush<F>(state: &mut ParseState, options: &ParseOptions, mut on_row: F)
where
    F: FnMut(Row),
{
    if state.buffer.is_empty() {
        return;
    }
    if !state.buffer.ends_with('\n') {
        state.buffer.push('\n');
    }

    parse(state, options, &mut on_row);

    if !state.buffer.is_empty() {
        tracing::warn!(
            pending = state.buffer.len(),
            "unterminated quote at end of input, absorbing into last field"
        );
        let ParseState {
            buffer,
            rows,
            cursor,
        } = state;
        scan_quoted(buffer, rows, cursor, options, true, &mut on_row);
        buffer.clear();
    }
}

/// Line-oriented scan for text without any enclosing character
fn scan_unquoted<F>(text: &str, rows: &mut RowBuilder, options: &ParseOptions, on_row: &mut F) -> usize
where
    F: FnMut(Row),
{
    let mut consumed = 0;

    while let Some(offset) = text[consumed..].find('\n') {
        let end = consumed + offset;
        let line = &text[consumed..end];
        let line = line.strip_suffix('\r').unwrap_or(line);

        for (column, value) in line.split(options.delimiter).enumerate() {
            rows.store(column, value.to_owned());
        }
        rows.complete(on_row);

        consumed = end + 1;
    }

    consumed
}

/// Character scan honouring quoted runs
///
/// Starts at `cursor` and leaves it at the end of the scanned text, so the
/// unfinished row is never read twice. Returns the number of bytes belonging
/// to completed rows. With `at_eof` the end of `text` also terminates the
/// final row.
fn scan_quoted<F>(
    text: &str,
    rows: &mut RowBuilder,
    cursor: &mut Cursor,
    options: &ParseOptions,
    at_eof: bool,
    on_row: &mut F,
) -> usize
where
    F: FnMut(Row),
{
    let delimiter = options.delimiter;
    let enclosing = options.enclosing;

    let start = cursor.offset;
    let mut scanned = text.len();
    let mut consumed = 0;
    let mut chars = text[start..].char_indices().peekable();

    while let Some((at, ch)) = chars.next() {
        let i = start + at;

        if cursor.in_quotes {
            if ch == enclosing {
                match chars.peek() {
                    // Doubled enclosing is a literal one
                    Some(&(_, next)) if next == enclosing => {
                        chars.next();
                        cursor.field.push(enclosing);
                    }
                    Some(_) => cursor.in_quotes = false,
                    None if at_eof => cursor.in_quotes = false,
                    None => {
                        // Closing or doubled? Decided by the next chunk
                        scanned = i;
                        break;
                    }
                }
            } else {
                cursor.field.push(ch);
            }
            cursor.trailing_cr = false;
            continue;
        }

        if ch == enclosing {
            cursor.in_quotes = true;
            cursor.trailing_cr = false;
        } else if ch == delimiter {
            rows.store(cursor.column, std::mem::take(&mut cursor.field));
            cursor.column += 1;
            cursor.trailing_cr = false;
        } else if ch == '\n' {
            if cursor.trailing_cr {
                cursor.field.pop();
            }
            rows.store(cursor.column, std::mem::take(&mut cursor.field));
            rows.complete(on_row);
            cursor.column = 0;
            cursor.trailing_cr = false;
            consumed = i + 1;
        } else {
            cursor.field.push(ch);
            cursor.trailing_cr = ch == '\r';
        }
    }

    if at_eof && consumed < text.len() {
        // The line break closing the input sits inside the open quote
        let mut field = std::mem::take(&mut cursor.field);
        if field.ends_with('\n') {
            field.pop();
            if field.ends_with('\r') {
                field.pop();
            }
        }
        rows.store(cursor.column, field);
        rows.complete(on_row);
        *cursor = Cursor::default();
        return text.len();
    }

    cursor.offset = scanned - consumed;
    consumed
}

/// Owned parse session
///
/// Wraps a [`ParseState`] with its options and a UTF-8 chunk decoder. Text
/// or bytes are pushed in arbitrary chunks; [`Parser::finish`] flushes the
/// final row and ends the session.
///
/// Every row handed to a callback is an owned `Vec<String>`; the parser keeps
/// no reference to it.
///
/// # Examples
///
/// ```
/// use dsvstream::dsv::Parser;
///
/// let mut parser = Parser::new();
/// let mut rows = Vec::new();
///
/// parser.push("name,quote\nalice,\"say ", |row| rows.push(row));
/// parser.push("\"\"hi\"\"\"\nbob,", |row| rows.push(row));
/// parser.finish(|row| rows.push(row));
///
/// assert_eq!(rows[1], vec!["alice", "say \"hi\""]);
/// assert_eq!(rows[2], vec!["bob", ""]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Parser {
    state: ParseState,
    options: ParseOptions,
    decoder: ChunkDecoder,
}

impl Parser {
    /// Create a parser with default options (`,` and `"`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options
    pub fn with_options(options: ParseOptions) -> Result<Self> {
        options.validate()?;
        Ok(Parser {
            state: ParseState::new(),
            options,
            decoder: ChunkDecoder::new(),
        })
    }

    /// Options this parser was created with
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Feed a chunk of text
    ///
    /// Rows completed by this chunk are emitted before returning.
    pub fn push<F>(&mut self, chunk: &str, on_row: F)
    where
        F: FnMut(Row),
    {
        self.state.append(chunk);
        if chunk.contains('\n') {
            parse(&mut self.state, &self.options, on_row);
        }
    }

    /// Feed a chunk of UTF-8 bytes; code points may be split across chunks
    pub fn push_bytes<F>(&mut self, chunk: &[u8], on_row: F)
    where
        F: FnMut(Row),
    {
        let start = self.decoder.decode(chunk, &mut self.state.buffer);
        if self.state.buffer[start..].contains('\n') {
            parse(&mut self.state, &self.options, on_row);
        }
    }

    /// End the session, emitting the final row if any
    ///
    /// Returns the total number of rows emitted over the session.
    pub fn finish<F>(mut self, on_row: F) -> u64
    where
        F: FnMut(Row),
    {
        if self.decoder.has_pending() {
            tracing::trace!("incomplete code point at end of input, replacing with U+FFFD");
        }
        self.decoder.finish(&mut self.state.buffer);
        flush(&mut self.state, &self.options, on_row);
        self.state.rows_emitted()
    }

    /// Text received but not yet emitted as rows
    pub fn pending(&self) -> &str {
        self.state.buffer()
    }

    /// Number of rows emitted so far
    pub fn rows_emitted(&self) -> u64 {
        self.state.rows_emitted()
    }
}
