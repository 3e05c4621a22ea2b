use crate::identifier::Identifier;
use crate::record::Record;
use crate::storage::traits::{PutOutcome, RecordStore};
use crate::storage::write_atomic;
use crate::MaterializeError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// One `<identifier>.json` file per record inside a data directory
///
/// File presence is the idempotence signal. Within one process, a claim set
/// serializes writers so that each identifier is written at most once.
#[derive(Debug)]
pub struct FsRecordStore {
    dir: PathBuf,
    claimed: Mutex<HashSet<Identifier>>,
    written: AtomicU64,
}

impl FsRecordStore {
    /// Opens a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            claimed: Mutex::new(HashSet::new()),
            written: AtomicU64::new(0),
        })
    }

    /// Path of the record file for `id`
    pub fn path_for(&self, id: &Identifier) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// The data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of records written through this store instance
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    fn release_claim(&self, id: &Identifier) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

impl RecordStore for FsRecordStore {
    fn contains(&self, id: &Identifier) -> bool {
        self.path_for(id).is_file()
    }

    fn put_if_absent(&self, record: &Record) -> Result<PutOutcome, MaterializeError> {
        let path = self.path_for(&record.id);

        {
            let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
            if claimed.contains(&record.id) || path.is_file() {
                return Ok(PutOutcome::AlreadyPresent);
            }
            claimed.insert(record.id.clone());
        }

        let bytes = match serde_json::to_vec(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.release_claim(&record.id);
                return Err(e.into());
            }
        };

        if let Err(source) = write_atomic(&path, &bytes) {
            self.release_claim(&record.id);
            return Err(MaterializeError::Storage {
                path: path.display().to_string(),
                source,
            });
        }

        self.written.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Wrote record {}", path.display());
        Ok(PutOutcome::Written)
    }

    fn list(&self) -> std::io::Result<Vec<Identifier>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(id) = Identifier::from_token(stem) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CodeFragments;
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(token: &str) -> Record {
        Record {
            id: Identifier::from_token(token).unwrap(),
            link: format!("https://oeis.org/{}", token),
            sequence: vec![serde_json::Number::from(1)],
            description: "A test sequence".to_string(),
            keywords: vec![],
            references: vec![],
            links: vec![],
            crossrefs: vec![],
            comments: vec![],
            code: CodeFragments::default(),
            retrieved_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("data");
        FsRecordStore::open(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_put_then_contains() {
        let tmp = TempDir::new().unwrap();
        let store = FsRecordStore::open(tmp.path()).unwrap();
        let rec = record("A000001");

        assert!(!store.contains(&rec.id));
        assert_eq!(store.put_if_absent(&rec).unwrap(), PutOutcome::Written);
        assert!(store.contains(&rec.id));

        let stored: Record =
            serde_json::from_slice(&std::fs::read(store.path_for(&rec.id)).unwrap()).unwrap();
        assert_eq!(stored, rec);
    }

    #[test]
    fn test_second_put_is_noop() {
        let tmp = TempDir::new().unwrap();
        let store = FsRecordStore::open(tmp.path()).unwrap();
        let first = record("A000001");
        let mut second = record("A000001");
        second.description = "Different content".to_string();

        assert_eq!(store.put_if_absent(&first).unwrap(), PutOutcome::Written);
        assert_eq!(
            store.put_if_absent(&second).unwrap(),
            PutOutcome::AlreadyPresent
        );
        assert_eq!(store.written(), 1);

        let stored: Record =
            serde_json::from_slice(&std::fs::read(store.path_for(&first.id)).unwrap()).unwrap();
        assert_eq!(stored.description, "A test sequence");
    }

    #[test]
    fn test_existing_file_from_previous_run_is_respected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("A000001.json"), b"{}").unwrap();

        let store = FsRecordStore::open(tmp.path()).unwrap();
        assert_eq!(
            store.put_if_absent(&record("A000001")).unwrap(),
            PutOutcome::AlreadyPresent
        );
        assert_eq!(store.written(), 0);
    }

    #[test]
    fn test_concurrent_puts_write_once() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(FsRecordStore::open(tmp.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.put_if_absent(&record("A000007")).unwrap())
            })
            .collect();

        let outcomes: Vec<PutOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let written = outcomes
            .iter()
            .filter(|o| **o == PutOutcome::Written)
            .count();

        assert_eq!(written, 1);
        assert_eq!(store.written(), 1);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_ignores_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let store = FsRecordStore::open(tmp.path()).unwrap();
        store.put_if_absent(&record("A000002")).unwrap();
        store.put_if_absent(&record("A000001")).unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(tmp.path().join("A000003.json.tmp"), b"x").unwrap();

        let ids: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(ids, vec!["A000001", "A000002"]);
    }
}
