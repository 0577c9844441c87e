//! DSV formatting with RFC 4180-like quoting

use crate::types::{FormatOptions, Value};

/// Encoder turning values into delimited text
///
/// A field is wrapped in the enclosing character, with embedded enclosing
/// characters doubled, iff it contains the delimiter, the enclosing
/// character, `\n` or `\r`. `Value::Null` is always written as a bare `NULL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DsvEncoder {
    options: FormatOptions,
}

impl DsvEncoder {
    /// Create a new encoder with the given delimiter and enclosing character
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Encode a row of values into `buffer`
    pub fn encode_row<'a, I>(&self, values: I, buffer: &mut String)
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                buffer.push(self.options.delimiter);
            }
            self.encode_value(value, buffer);
        }
    }

    /// Encode a row of plain strings into `buffer`
    pub fn encode_fields<I, S>(&self, fields: I, buffer: &mut String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                buffer.push(self.options.delimiter);
            }
            self.encode_field(field.as_ref(), buffer);
        }
    }

    /// Encode a single value into `buffer`
    pub fn encode_value(&self, value: &Value, buffer: &mut String) {
        match value {
            Value::Null => buffer.push_str("NULL"),
            other => self.encode_field(&other.as_text(), buffer),
        }
    }

    /// Encode single field with proper quoting/escaping
    fn encode_field(&self, field: &str, buffer: &mut String) {
        if self.needs_quoting(field) {
            let enclosing = self.options.enclosing;
            buffer.reserve(field.len() + 2);
            buffer.push(enclosing);
            for ch in field.chars() {
                if ch == enclosing {
                    buffer.push(enclosing);
                }
                buffer.push(ch);
            }
            buffer.push(enclosing);
        } else {
            buffer.push_str(field);
        }
    }

    /// Check if field requires quoting
    fn needs_quoting(&self, field: &str) -> bool {
        let FormatOptions {
            delimiter,
            enclosing,
        } = self.options;
        field.contains(|c: char| c == delimiter || c == enclosing || c == '\n' || c == '\r')
    }
}

/// Format a single value
///
/// # Examples
///
/// ```
/// use dsvstream::{format_value, FormatOptions, Value};
///
/// let opts = FormatOptions::default();
/// assert_eq!(format_value(&Value::Null, &opts), "NULL");
/// assert_eq!(format_value(&"say \"hi\"".into(), &opts), "\"say \"\"hi\"\"\"");
/// ```
pub fn format_value(value: &Value, options: &FormatOptions) -> String {
    let mut out = String::new();
    DsvEncoder::new(*options).encode_value(value, &mut out);
    out
}

/// Format a row of values joined by the delimiter
pub fn format_row(row: &[Value], options: &FormatOptions) -> String {
    let mut out = String::new();
    DsvEncoder::new(*options).encode_row(row, &mut out);
    out
}

/// Format rows joined by `\n`, without a trailing line break
///
/// # Examples
///
/// ```
/// use dsvstream::{format_rows, FormatOptions, Value};
///
/// let rows = vec![
///     vec![Value::from("a"), Value::from(1i64)],
///     vec![Value::from("b,c"), Value::Null],
/// ];
/// assert_eq!(format_rows(&rows, &FormatOptions::default()), "a,1\n\"b,c\",NULL");
/// ```
pub fn format_rows<R>(rows: &[R], options: &FormatOptions) -> String
where
    R: AsRef<[Value]>,
{
    let encoder = DsvEncoder::new(*options);
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        encoder.encode_row(row.as_ref(), &mut out);
    }
    out
}
