//! Storage module for persisting harvest data
//!
//! This module handles everything written to disk:
//! - Per-identifier record files (`FsRecordStore`)
//! - The frontier checkpoint (`FrontierStore`)
//! - Atomic replace-by-rename writes shared by both

mod frontier;
mod records;
mod traits;

pub use frontier::FrontierStore;
pub use records::FsRecordStore;
pub use traits::{PutOutcome, RecordStore};

use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes `data` to `path` atomically
///
/// The bytes go to `<path>.tmp` in the same directory, are synced, and the
/// temporary file is renamed over `path`. Readers see either the old file or
/// the complete new one.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
