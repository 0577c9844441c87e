//! Turning rows into header-keyed records

use crate::types::Row;
use indexmap::IndexMap;
use std::sync::Arc;

/// A data row keyed by header name, in header order
pub type Record = IndexMap<String, String>;

/// Maps rows onto a fixed header
///
/// Built once from the header row; the header is shared so clones of the
/// mapper are cheap.
#[derive(Debug, Clone)]
pub struct RecordMapper {
    headers: Arc<[String]>,
}

impl RecordMapper {
    /// Create a mapper for the given header row
    pub fn new(headers: Row) -> Self {
        RecordMapper {
            headers: headers.into(),
        }
    }

    /// Header names in column order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Key `row` by header name
    ///
    /// Columns beyond the header are dropped; headers beyond a short row are
    /// left out of the record. With duplicate header names the last column
    /// wins.
    pub fn map(&self, row: Row) -> Record {
        let mut record = IndexMap::with_capacity(self.headers.len());
        for (key, value) in self.headers.iter().zip(row) {
            record.insert(key.clone(), value);
        }
        record
    }
}

/// Wrap a record callback into a row callback
///
/// The first row received is taken as the header and never forwarded; every
/// later row reaches `on_record` as a [`Record`].
///
/// # Examples
///
/// ```
/// use dsvstream::{parse_string, row_to_object, ParseOptions};
///
/// let mut records = Vec::new();
/// parse_string(
///     "id,name\n1,alice\n2,bob\n",
///     &ParseOptions::default(),
///     row_to_object(|record| records.push(record)),
/// )?;
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1]["name"], "bob");
/// # Ok::<(), dsvstream::DsvError>(())
/// ```
pub fn row_to_object<F>(mut on_record: F) -> impl FnMut(Row)
where
    F: FnMut(Record),
{
    let mut mapper: Option<RecordMapper> = None;

    move |row| {
        if let Some(mapper) = &mapper {
            on_record(mapper.map(row));
        } else {
            tracing::debug!(columns = row.len(), "captured header row");
            mapper = Some(RecordMapper::new(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_not_forwarded() {
        let mut records = Vec::new();
        {
            let mut on_row = row_to_object(|record| records.push(record));
            on_row(row(&["a", "b"]));
        }
        assert!(records.is_empty());
    }

    #[test]
    fn test_records_keyed_in_header_order() {
        let mut records = Vec::new();
        {
            let mut on_row = row_to_object(|record| records.push(record));
            on_row(row(&["id", "name", "city"]));
            on_row(row(&["1", "Alice", "NYC"]));
        }
        let keys: Vec<&str> = records[0].keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "name", "city"]);
        assert_eq!(records[0]["city"], "NYC");
    }

    #[test]
    fn test_ragged_rows() {
        let mapper = RecordMapper::new(row(&["a", "b", "c"]));

        let short = mapper.map(row(&["1"]));
        assert_eq!(short.len(), 1);
        assert_eq!(short.get("a").map(String::as_str), Some("1"));
        assert!(short.get("b").is_none());

        let long = mapper.map(row(&["1", "2", "3", "4"]));
        assert_eq!(long.len(), 3);
    }

    #[test]
    fn test_duplicate_headers_last_wins() {
        let mapper = RecordMapper::new(row(&["k", "k"]));
        let record = mapper.map(row(&["first", "second"]));
        assert_eq!(record.len(), 1);
        assert_eq!(record["k"], "second");
    }
}
