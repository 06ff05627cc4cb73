//! Result output writers

use crate::decode::DecodedResult;

pub mod csv;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Results cannot be written as one table
    #[error("inconsistent results: {0}")]
    Inconsistent(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Header and rows of a result, flattened to plain string records
///
/// JSON results yield the column codes as header and `key ++ values` per record.
pub fn tabulate(result: &DecodedResult) -> (Vec<String>, Vec<Vec<String>>) {
    match result {
        DecodedResult::Json(r) => {
            let header = r.columns.iter().map(|c| c.code.clone()).collect();
            let rows = r
                .data
                .iter()
                .map(|point| point.key.iter().chain(&point.values).cloned().collect())
                .collect();
            (header, rows)
        }
        DecodedResult::Csv(r) => {
            let rows = (0..r.data.len())
                .filter_map(|i| r.row(i))
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect();
            (r.column_names.clone(), rows)
        }
    }
}

/// Rows of all partition results under one header, in partition order
///
/// Returns an empty header and no rows for an empty slice.
///
/// # Errors
/// Returns `Inconsistent` if partitions disagree on the header
pub fn flatten_records(results: &[DecodedResult]) -> OutputResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (index, result) in results.iter().enumerate() {
        let (columns, mut records) = tabulate(result);
        match &header {
            None => header = Some(columns),
            Some(expected) if *expected != columns => {
                return Err(OutputError::Inconsistent(format!(
                    "result {} has header {:?}, expected {:?}",
                    index + 1,
                    columns,
                    expected
                )));
            }
            Some(_) => {}
        }
        rows.append(&mut records);
    }

    Ok((header.unwrap_or_default(), rows))
}
