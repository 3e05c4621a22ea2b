//! Compaction of record files into a single archive
//!
//! Every `<identifier>.json` file in the data directory is read as a generic
//! JSON value and the values are written, in file-name order, as one JSON
//! array. Other files, including a previous archive, are ignored.

use crate::identifier::Identifier;
use crate::storage::write_atomic;
use crate::CompactError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// Concatenates every record file in `data_dir` into a JSON array at `out_path`
///
/// # Returns
///
/// * `Ok(usize)` - Number of records written to the archive
/// * `Err(CompactError)` - A file could not be read, or was not valid JSON
pub fn compact(data_dir: &Path, out_path: &Path) -> Result<usize, CompactError> {
    let files = record_files(data_dir)?;
    let mut records = Vec::with_capacity(files.len());

    for path in &files {
        let content = std::fs::read(path).map_err(|source| CompactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_slice(&content).map_err(|source| CompactError::Malformed {
                path: path.display().to_string(),
                source,
            })?;
        records.push(value);
    }

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut serializer)
        .map_err(|source| CompactError::Malformed {
            path: out_path.display().to_string(),
            source,
        })?;

    write_atomic(out_path, &buf).map_err(|source| CompactError::Io {
        path: out_path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "Compacted {} records into {}",
        records.len(),
        out_path.display()
    );
    Ok(records.len())
}

/// Sorted paths of the record files directly inside `dir`
fn record_files(dir: &Path) -> Result<Vec<PathBuf>, CompactError> {
    let io_err = |source: std::io::Error| CompactError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_record = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(".json"))
            .is_some_and(|stem| Identifier::from_token(stem).is_ok());
        if is_record && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
