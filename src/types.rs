//! Type definitions shared by the parser and the formatter

use crate::error::{DsvError, Result};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::borrow::Cow;
use std::fmt;

/// A parsed row: ordered string columns
pub type Row = Vec<String>;

/// Delimiter and enclosing characters for one direction of a pipeline
///
/// The same options drive parsing and formatting. When formatting they only
/// decide which characters trigger quoting, so they need not match the
/// options the data was parsed with, though round-tripping requires it.
///
/// # Examples
///
/// ```
/// use dsvstream::ParseOptions;
///
/// let opts = ParseOptions::default().delimiter(';');
/// assert_eq!(opts.delimiter, ';');
/// assert_eq!(opts.enclosing, '"');
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// Field separator (default `,`)
    pub delimiter: char,
    /// Quote character wrapping fields that need escaping (default `"`)
    pub enclosing: char,
}

/// Options controlling the formatter; identical to [`ParseOptions`]
pub type FormatOptions = ParseOptions;

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            delimiter: ',',
            enclosing: '"',
        }
    }
}

impl ParseOptions {
    /// Comma separated, double-quote enclosed
    pub fn csv() -> Self {
        Self::default()
    }

    /// Tab separated, double-quote enclosed
    pub fn tsv() -> Self {
        Self::default().delimiter('\t')
    }

    /// Set custom delimiter (builder pattern)
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set custom enclosing character (builder pattern)
    pub fn enclosing(mut self, enclosing: char) -> Self {
        self.enclosing = enclosing;
        self
    }

    /// Check that the delimiter and enclosing can be told apart from each
    /// other and from line breaks
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == self.enclosing {
            return Err(DsvError::InvalidOptions(format!(
                "delimiter and enclosing must differ (both are {:?})",
                self.delimiter
            )));
        }
        for (name, ch) in [("delimiter", self.delimiter), ("enclosing", self.enclosing)] {
            if ch == '\n' || ch == '\r' {
                return Err(DsvError::InvalidOptions(format!(
                    "{} cannot be a line break ({:?})",
                    name, ch
                )));
            }
        }
        Ok(())
    }
}

/// A value to be written into a delimited row
///
/// Each variant has exactly one textual rendering, see [`Value::as_text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value, rendered as the literal `NULL`
    Null,
    /// Text value
    Text(String),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Point in time, rendered as ISO-8601 UTC with milliseconds
    Date(DateTime<Utc>),
    /// Raw bytes, rendered as UTF-8 text (invalid sequences become U+FFFD)
    Bytes(Vec<u8>),
}

impl Value {
    /// Unquoted textual rendering of the value
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed("NULL"),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Int(i) => {
                let mut buf = itoa::Buffer::new();
                Cow::Owned(buf.format(*i).to_owned())
            }
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Value::Date(d) => Cow::Owned(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(d: DateTime<Tz>) -> Self {
        Value::Date(d.with_timezone(&Utc))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ParseOptions::default();
        assert_eq!(opts.delimiter, ',');
        assert_eq!(opts.enclosing, '"');
        assert_eq!(ParseOptions::tsv().delimiter, '\t');
    }

    #[test]
    fn test_validate_rejects_same_chars() {
        let opts = ParseOptions::default().delimiter('"');
        assert!(matches!(opts.validate(), Err(DsvError::InvalidOptions(_))));
    }

    #[test]
    fn test_validate_rejects_line_break() {
        assert!(ParseOptions::default().delimiter('\n').validate().is_err());
        assert!(ParseOptions::default().enclosing('\r').validate().is_err());
    }

    #[test]
    fn test_value_text() {
        assert_eq!(Value::Null.as_text(), "NULL");
        assert_eq!(Value::Int(-42).as_text(), "-42");
        assert_eq!(Value::Float(1.0).as_text(), "1");
        assert_eq!(Value::Float(3.25).as_text(), "3.25");
        assert_eq!(Value::Bool(true).as_text(), "true");
        assert_eq!(Value::Bytes(b"abc".to_vec()).as_text(), "abc");
        assert_eq!(Value::Bytes(vec![b'a', 0xff]).as_text(), "a\u{fffd}");
    }

    #[test]
    fn test_value_date() {
        let d = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::from(d).as_text(), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from(7i32), Value::Int(7));
    }
}
