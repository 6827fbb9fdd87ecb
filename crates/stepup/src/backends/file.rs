//! File-backed backend with atomic persistence.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{MigrateError, MigrateResult};
use crate::store::KeyValueBackend;

/// JSON-file key-value backend.
///
/// Writes are staged in memory; `flush` rewrites the whole document through
/// a temp file renamed over the target, so the file on disk is always a
/// complete snapshot. A crash between `set` and `flush` loses only the
/// staged write.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileBackend {
    /// Open the store at `path`, loading any existing document. A missing
    /// file yields an empty store; the file is created on first `flush`.
    pub fn open(path: impl Into<PathBuf>) -> MigrateResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> MigrateResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MigrateResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MigrateResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn flush(&self) -> MigrateResult<()> {
        let document = serde_json::to_string_pretty(&*self.entries.read())?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|err| MigrateError::Io(err.error))?;

        debug!(path = %self.path.display(), "persisted progress file");
        Ok(())
    }
}
