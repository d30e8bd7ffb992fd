//! Delimited-text input and output tables.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::common::constants::{resolution_columns, NAME_COLUMN};
use crate::common::error::{CuratorError, Result};
use crate::common::types::{CleanRecord, CompoundRecord, ResolutionResult, ResolutionStatus};

/// Parsed input: pass-through headers in input order plus one record per row.
#[derive(Debug, Clone)]
pub struct InputTable {
    pub passthrough_headers: Vec<String>,
    pub records: Vec<CompoundRecord>,
    /// Total number of columns in the input header row
    pub column_count: usize,
}

/// Read and validate the compound table. Any problem here is fatal to the batch.
pub fn read_compounds(path: &Path, delimiter: u8) -> Result<InputTable> {
    if !path.exists() {
        return Err(CuratorError::Input(format!("File '{}' not found", path.display())));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|e| CuratorError::Input(format!("Cannot open '{}': {}", path.display(), e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CuratorError::Input(format!("Cannot read header row: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CuratorError::Input(format!("'{}' has no header row", path.display())));
    }

    let name_idx = headers.iter().position(|h| h == NAME_COLUMN).ok_or_else(|| {
        CuratorError::Input(format!(
            "Missing required column '{}'. Available columns: {:?}",
            NAME_COLUMN, headers
        ))
    })?;

    let reserved: HashSet<&str> = resolution_columns().into_iter().collect();
    let mut passthrough_idx = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == name_idx {
            continue;
        }
        if reserved.contains(header.as_str()) {
            warn!("Input column '{}' collides with an output column and will not be carried through", header);
            continue;
        }
        passthrough_idx.push(idx);
    }
    let passthrough_headers: Vec<String> = passthrough_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let line = row + 2;
        let fields = result.map_err(|e| CuratorError::Input(format!("Row {}: {}", line, e)))?;
        let source_name = fields.get(name_idx).unwrap_or("");
        let name = source_name.trim();
        if name.is_empty() {
            return Err(CuratorError::Input(format!("Row {}: '{}' is empty", line, NAME_COLUMN)));
        }
        let passthrough = passthrough_idx
            .iter()
            .map(|&i| (headers[i].clone(), fields.get(i).unwrap_or("").to_string()))
            .collect();
        records.push(CompoundRecord {
            row,
            name: name.to_string(),
            source_name: source_name.to_string(),
            passthrough,
        });
    }

    info!(
        "Input file valid: {} rows, {} columns",
        records.len(),
        headers.len()
    );
    Ok(InputTable {
        passthrough_headers,
        records,
        column_count: headers.len(),
    })
}

fn output_header(passthrough_headers: &[String]) -> StringRecord {
    let mut header = StringRecord::new();
    for column in resolution_columns() {
        header.push_field(column);
    }
    for column in passthrough_headers {
        header.push_field(column);
    }
    header
}

fn output_row(record: &CompoundRecord, cid: Option<u64>, smiles: Option<&str>, status: ResolutionStatus) -> StringRecord {
    let cid = cid.map(|c| c.to_string()).unwrap_or_default();
    let mut row = StringRecord::new();
    row.push_field(&record.source_name);
    row.push_field(&cid);
    row.push_field(smiles.unwrap_or(""));
    row.push_field(status.as_str());
    for (_, value) in &record.passthrough {
        row.push_field(value);
    }
    row
}

/// Write every result, failures included, in input order.
pub fn write_results(path: &Path, delimiter: u8, passthrough_headers: &[String], results: &[ResolutionResult]) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(&output_header(passthrough_headers))?;
    for result in results {
        let resolution = &result.resolution;
        writer.write_record(&output_row(&result.record, resolution.cid(), resolution.smiles(), resolution.status()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the quality-filtered rows with the same schema as the full table.
pub fn write_clean(path: &Path, delimiter: u8, passthrough_headers: &[String], clean: &[CleanRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(&output_header(passthrough_headers))?;
    for record in clean {
        writer.write_record(&output_row(&record.record, Some(record.cid), Some(&record.smiles), record.status))?;
    }
    writer.flush()?;
    Ok(())
}
