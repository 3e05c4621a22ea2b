use crate::identifier::Identifier;
use crate::storage::write_atomic;
use crate::FrontierError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Durable checkpoint of the known set
///
/// The file is a JSON array of identifier strings, rewritten atomically after
/// every round. Entries written as full addresses (`http://oeis.org/A000045`)
/// are accepted on load.
#[derive(Debug, Clone)]
pub struct FrontierStore {
    path: PathBuf,
}

impl FrontierStore {
    /// Creates a store for the frontier file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the frontier file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if a frontier file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the persisted known set
    ///
    /// # Returns
    ///
    /// * `Ok(BTreeSet<Identifier>)` - The known set; unrecognized entries are left out
    /// * `Err(FrontierError::NotFound)` - No frontier has been persisted yet
    /// * `Err(FrontierError::Parse)` - The file is not a JSON array of strings
    pub fn load(&self) -> Result<BTreeSet<Identifier>, FrontierError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FrontierError::NotFound(self.path.display().to_string()));
            }
            Err(source) => {
                return Err(FrontierError::Io {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        let entries: Vec<String> =
            serde_json::from_slice(&content).map_err(|source| FrontierError::Parse {
                path: self.path.display().to_string(),
                source,
            })?;

        let mut known = BTreeSet::new();
        for entry in entries {
            match entry.parse::<Identifier>() {
                Ok(id) => {
                    known.insert(id);
                }
                Err(e) => tracing::warn!("Ignoring frontier entry, it is kept on disk: {}", e),
            }
        }

        tracing::debug!(
            "Loaded {} identifiers from {}",
            known.len(),
            self.path.display()
        );
        Ok(known)
    }

    /// Overwrites the persisted known set
    ///
    /// Entries of the current file that `load` could not recognize are carried
    /// over after the identifiers, so a snapshot never drops them. The file is
    /// written to a temporary beside the target and renamed into place, so an
    /// interrupted write never leaves a truncated frontier behind.
    pub fn snapshot(&self, known: &BTreeSet<Identifier>) -> Result<(), FrontierError> {
        let retained = self.unrecognized_entries();
        self.write(known, &retained)
    }

    /// Writes an initial frontier
    ///
    /// Refuses to replace an existing frontier unless `overwrite` is set. An
    /// overwritten frontier is replaced entirely.
    pub fn initialize(
        &self,
        known: &BTreeSet<Identifier>,
        overwrite: bool,
    ) -> Result<(), FrontierError> {
        self.ensure_writable(overwrite)?;
        self.write(known, &[])
    }

    /// Fails with `AlreadyExists` if a frontier exists and `overwrite` is unset
    pub fn ensure_writable(&self, overwrite: bool) -> Result<(), FrontierError> {
        if !overwrite && self.exists() {
            return Err(FrontierError::AlreadyExists(
                self.path.display().to_string(),
            ));
        }
        Ok(())
    }

    /// Entries of the current file that are not identifiers
    ///
    /// A missing or unreadable file has none.
    fn unrecognized_entries(&self) -> Vec<String> {
        let Ok(content) = std::fs::read(&self.path) else {
            return Vec::new();
        };
        let Ok(entries) = serde_json::from_slice::<Vec<String>>(&content) else {
            return Vec::new();
        };

        entries
            .into_iter()
            .filter(|entry| entry.parse::<Identifier>().is_err())
            .collect()
    }

    fn write(&self, known: &BTreeSet<Identifier>, retained: &[String]) -> Result<(), FrontierError> {
        let entries: Vec<&str> = known
            .iter()
            .map(Identifier::as_str)
            .chain(retained.iter().map(String::as_str))
            .collect();
        let bytes = serde_json::to_vec_pretty(&entries)?;
        write_atomic(&self.path, &bytes).map_err(|source| FrontierError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}
