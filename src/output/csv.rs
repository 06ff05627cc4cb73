//! CSV output of decoded results
//!
//! Partition results are concatenated in order under a single header.

use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use super::{flatten_records, OutputError, OutputResult};
use crate::decode::DecodedResult;

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Write `results` to a CSV file at `path`
///
/// # Returns
/// Number of data rows written
///
/// # Errors
/// Returns `Inconsistent` if partitions disagree on the header
pub fn write_results<P: AsRef<Path>>(path: P, results: &[DecodedResult]) -> OutputResult<u64> {
    let path = path.as_ref();
    info!("Creating CSV writer: path={}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
    }

    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

    write_results_to(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file), results)
}

/// Write `results` as CSV to any writer
pub fn write_results_to<W: Write>(writer: W, results: &[DecodedResult]) -> OutputResult<u64> {
    let (header, rows) = flatten_records(results)?;
    let mut csv_writer = Writer::from_writer(writer);

    if !results.is_empty() {
        csv_writer
            .write_record(&header)
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;
    }

    for row in &rows {
        csv_writer
            .write_record(row)
            .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
    }

    csv_writer
        .flush()
        .map_err(|e| OutputError::IoError(format!("Failed to flush: {e}")))?;
    debug!(partitions = results.len(), rows = rows.len(), "Wrote CSV output");
    Ok(rows.len() as u64)
}
