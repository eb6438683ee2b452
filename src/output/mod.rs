mod summary;

pub use summary::write_refine_summary;

use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::OutputError;

/// Append-mode JSONL writer. One serialized record per line, flushed per
/// write so an interrupted run keeps everything already emitted.
pub struct JsonlWriter {
    file: File,
}

impl JsonlWriter {
    pub fn append(path: &Path) -> Result<Self, OutputError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(OutputError::WriteRecord)?;
        Ok(Self { file })
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), OutputError> {
        let json = serde_json::to_string(record)?;
        writeln!(self.file, "{}", json).map_err(OutputError::WriteRecord)?;
        self.file.flush().map_err(OutputError::WriteRecord)
    }
}

/// Write records to a fresh JSONL file (truncating any previous content).
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
        }
    }
    let mut content = String::new();
    for record in records {
        content.push_str(&serde_json::to_string(record)?);
        content.push('\n');
    }
    fs::write(path, content).map_err(OutputError::WriteRecord)
}
