//! Parallel parsing of independent inputs

use crate::dsv::{flush, ParseState};
use crate::error::Result;
use crate::types::{ParseOptions, Row};
use rayon::prelude::*;

/// Parse many independent inputs on the rayon thread pool
///
/// Each input gets its own [`ParseState`]; states are never shared between
/// inputs. The outer vector is in input order.
///
/// # Examples
///
/// ```
/// use dsvstream::{parse_many, ParseOptions};
///
/// let parsed = parse_many(&["a,b\n", "c\nd"], &ParseOptions::default())?;
/// assert_eq!(parsed[0], vec![vec!["a", "b"]]);
/// assert_eq!(parsed[1], vec![vec!["c"], vec!["d"]]);
/// # Ok::<(), dsvstream::DsvError>(())
/// ```
pub fn parse_many<S>(inputs: &[S], options: &ParseOptions) -> Result<Vec<Vec<Row>>>
where
    S: AsRef<str> + Sync,
{
    options.validate()?;

    let parsed: Vec<Vec<Row>> = inputs
        .par_iter()
        .map(|input| {
            let mut rows = Vec::new();
            let mut state = ParseState::with_buffer(input.as_ref());
            flush(&mut state, options, |row| rows.push(row));
            rows
        })
        .collect();

    tracing::debug!(inputs = inputs.len(), "parsed inputs in parallel");
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::parse_to_rows;

    #[test]
    fn test_matches_sequential() -> Result<()> {
        let inputs: Vec<String> = (0..32)
            .map(|i| format!("id,value\n{},\"v,{}\"\n{},x", i, i, i + 1))
            .collect();
        let opts = ParseOptions::default();

        let parsed = parse_many(&inputs, &opts)?;
        for (input, rows) in inputs.iter().zip(&parsed) {
            assert_eq!(rows, &parse_to_rows(input, &opts)?);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_options() {
        let opts = ParseOptions::default().delimiter('"');
        assert!(parse_many(&["a"], &opts).is_err());
    }
}
