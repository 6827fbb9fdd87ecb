//! Progress persistence: the storage capability and the marker store.

use tracing::debug;

use crate::config::MigratorConfig;
use crate::error::{MigrateError, MigrateResult};
use crate::version::Version;

/// Key-value persistence capability the sequencer keeps its marker in.
///
/// `set` and `remove` may stage the write; `flush` is the durability point.
/// Implementations must tolerate keys they have never seen.
pub trait KeyValueBackend: Send + Sync {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> MigrateResult<Option<String>>;

    /// Stage `value` under `key`
    fn set(&self, key: &str, value: &str) -> MigrateResult<()>;

    /// Remove any value stored under `key`
    fn remove(&self, key: &str) -> MigrateResult<()>;

    /// Make staged writes durable
    fn flush(&self) -> MigrateResult<()>;
}

/// Owns the persisted "last migrated version" marker.
///
/// The marker starts unset, is written at most once by [`set_initial`],
/// and thereafter only moves forward through [`advance`] as the engine
/// completes steps.
///
/// [`set_initial`]: ProgressStore::set_initial
/// [`advance`]: ProgressStore::advance
pub struct ProgressStore {
    backend: Box<dyn KeyValueBackend>,
    marker_key: String,
}

impl ProgressStore {
    /// Create a store over `backend` with the default marker key.
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self::with_config(backend, &MigratorConfig::default())
    }

    /// Create a store over `backend` with the configured marker key.
    pub fn with_config(backend: impl KeyValueBackend + 'static, config: &MigratorConfig) -> Self {
        Self {
            backend: Box::new(backend),
            marker_key: config.marker_key.clone(),
        }
    }

    /// The last successfully migrated version, or `None` when no migration
    /// has ever completed.
    ///
    /// A marker that is present but unparsable is an error, never treated
    /// as unset.
    pub fn last_migrated(&self) -> MigrateResult<Option<Version>> {
        match self.backend.get(&self.marker_key)? {
            Some(raw) => {
                let version = Version::parse(&raw).map_err(|_| MigrateError::CorruptMarker {
                    key: self.marker_key.clone(),
                    value: raw,
                })?;
                Ok(Some(version))
            }
            None => Ok(None),
        }
    }

    /// Write-once bootstrap: persists `version` only while no marker exists.
    pub fn set_initial(&self, version: Version) -> MigrateResult<()> {
        if self.last_migrated()?.is_some() {
            debug!(%version, "marker already set, ignoring initial version");
            return Ok(());
        }
        self.write(version)
    }

    /// Unconditionally overwrite the marker.
    ///
    /// The engine only calls this with versions strictly greater than the
    /// current marker; the store does not re-check.
    pub fn advance(&self, version: Version) -> MigrateResult<()> {
        self.write(version)
    }

    /// Clear the marker entirely. Test/bootstrap use.
    pub fn reset(&self) -> MigrateResult<()> {
        self.backend.remove(&self.marker_key)?;
        self.backend.flush()
    }

    fn write(&self, version: Version) -> MigrateResult<()> {
        self.backend.set(&self.marker_key, &version.to_string())?;
        self.backend.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn marker_starts_unset() {
        let store = ProgressStore::new(MemoryBackend::new());
        assert_eq!(store.last_migrated().unwrap(), None);
    }

    #[test]
    fn initial_version_is_write_once() {
        let store = ProgressStore::new(MemoryBackend::new());

        store.set_initial(v("2.0.0")).unwrap();
        assert_eq!(store.last_migrated().unwrap(), Some(v("2.0.0")));

        store.set_initial(v("4.0.0")).unwrap();
        assert_eq!(store.last_migrated().unwrap(), Some(v("2.0.0")));
    }

    #[test]
    fn advance_overwrites() {
        let store = ProgressStore::new(MemoryBackend::new());

        store.set_initial(v("1.0.0")).unwrap();
        store.advance(v("1.1.0")).unwrap();
        assert_eq!(store.last_migrated().unwrap(), Some(v("1.1.0")));
    }

    #[test]
    fn reset_clears_marker() {
        let store = ProgressStore::new(MemoryBackend::new());

        store.set_initial(v("1.0.0")).unwrap();
        store.reset().unwrap();
        assert_eq!(store.last_migrated().unwrap(), None);
    }

    #[test]
    fn marker_seeded_through_backend_is_visible() {
        let backend = MemoryBackend::new();
        backend.set("stepup.last_migrated_version", "1.0.0").unwrap();
        backend.flush().unwrap();

        let store = ProgressStore::new(backend);
        assert_eq!(store.last_migrated().unwrap(), Some(v("1.0.0")));
    }

    #[test]
    fn unparsable_marker_is_an_error() {
        let backend = MemoryBackend::new();
        backend.set("stepup.last_migrated_version", "not-a-version").unwrap();

        let store = ProgressStore::new(backend);
        let err = store.last_migrated().unwrap_err();
        assert!(matches!(
            err,
            MigrateError::CorruptMarker { ref value, .. } if value == "not-a-version"
        ));

        // A corrupt marker also blocks the write-once bootstrap.
        assert!(store.set_initial(v("1.0.0")).is_err());
    }

    #[test]
    fn custom_marker_key_is_respected() {
        let config = MigratorConfig {
            marker_key: "app.progress".to_string(),
        };
        let backend = MemoryBackend::new();
        backend.set("app.progress", "0.9.0").unwrap();

        let store = ProgressStore::with_config(backend, &config);
        assert_eq!(store.last_migrated().unwrap(), Some(v("0.9.0")));
    }
}
