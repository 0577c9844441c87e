//! # dsvstream
//!
//! Incremental parser and formatter for delimiter-separated text (CSV, TSV
//! and any other single-character delimiter).
//!
//! Input can arrive as a whole string, as pushed chunks, or as an
//! asynchronous byte stream. The rows produced are the same however the
//! input is sliced, including splits inside quoted fields, escaped quotes,
//! `\r\n` pairs and multi-byte characters.
//!
//! ## Features
//!
//! - **One-shot**: [`parse_string`]
//! - **Push**: [`PushParser`], [`parse_stream`] over any [`std::io::Read`]
//! - **Pull (async)**: [`parse_web_stream`] over any tokio `AsyncRead`
//! - **Records**: [`row_to_object`] keys rows by the header row
//! - **Formatting**: [`format_value`], [`format_row`], [`format_rows`]
//! - **Files**: [`DsvReader`] and [`DsvWriter`]
//! - **Parallel**: `parse_many` with the `parallel` feature
//!
//! Malformed input is never an error: unbalanced quotes and ragged rows
//! still produce rows.
//!
//! ## Quick Start
//!
//! ```
//! use dsvstream::{format_row, parse_string, ParseOptions, Value};
//!
//! let opts = ParseOptions::default();
//! let mut rows = Vec::new();
//! parse_string("name,quote\nAlice,\"Say \"\"hi\"\"\"\n", &opts, |row| rows.push(row))?;
//! assert_eq!(rows[1], vec!["Alice", "Say \"hi\""]);
//!
//! let line = format_row(&[Value::from("a"), Value::from("b\n"), Value::from("c")], &opts);
//! assert_eq!(line, "a,\"b\n\",c");
//! # Ok::<(), dsvstream::DsvError>(())
//! ```

pub mod dsv;
pub mod dsv_reader;
pub mod dsv_writer;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod record;
pub mod stream;
pub mod types;
#[cfg(feature = "async")]
pub mod web_stream;

pub use dsv::{format_row, format_rows, format_value, ParseState, Parser};
pub use dsv_reader::DsvReader;
pub use dsv_writer::DsvWriter;
pub use error::{DsvError, Result};
#[cfg(feature = "parallel")]
pub use parallel::parse_many;
pub use record::{row_to_object, Record, RecordMapper};
pub use stream::{parse_stream, parse_string, parse_to_rows, PushParser};
pub use types::{FormatOptions, ParseOptions, Row, Value};
#[cfg(feature = "async")]
pub use web_stream::{parse_web_stream, StreamReader};
