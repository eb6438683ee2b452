use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::debug;

use crate::error::IngestError;

/// Open a JSONL file for line-by-line streaming. Callers own per-line
/// parsing (and the bookkeeping of lines that fail it).
pub fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufReader::new(file).lines())
}

/// Read a whole JSONL file into typed records. Blank lines are ignored;
/// lines that fail to parse are counted and skipped, never fatal. Only I/O
/// failures surface as errors.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, usize), IngestError> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in open_lines(path)?.enumerate() {
        let line = line.map_err(IngestError::Io)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("Skipping line {} of {:?}: {}", line_no + 1, path, e);
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}
