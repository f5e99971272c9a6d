use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Mutex;
use tracing::debug;

use clara_utils::atomic_write::write_file_atomic;
use clara_utils::error::VaultError;

/// Durable single-slot storage for the encoded vault record.
///
/// The controller is the only writer. Writes replace the whole record.
pub trait VaultStore: Send + Sync {
    /// Read the record, `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>, VaultError>;

    /// Replace the record.
    fn store(&self, record: &str) -> Result<(), VaultError>;

    /// Delete the record. Removing an absent record succeeds.
    fn remove(&self) -> Result<(), VaultError>;

    fn exists(&self) -> Result<bool, VaultError> {
        Ok(self.load()?.is_some())
    }
}

/// Record kept in one file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileVaultStore {
    path: Utf8PathBuf,
}

impl FileVaultStore {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<CLARA_HOME>/vault/encrypted_key`.
    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(clara_utils::paths::vault_record_path())
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl VaultStore for FileVaultStore {
    fn load(&self) -> Result<Option<String>, VaultError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::Storage(format!(
                "failed to read {}: {e}",
                self.path
            ))),
        }
    }

    fn store(&self, record: &str) -> Result<(), VaultError> {
        write_file_atomic(&self.path, record)
            .map_err(|e| VaultError::Storage(format!("{e:#}")))?;
        debug!(path = %self.path, bytes = record.len(), "Vault record written");
        Ok(())
    }

    fn remove(&self) -> Result<(), VaultError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path, "Vault record removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Storage(format!(
                "failed to remove {}: {e}",
                self.path
            ))),
        }
    }
}

/// In-memory slot for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryVaultStore {
    slot: Mutex<Option<String>>,
}

impl MemoryVaultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `record`.
    #[must_use]
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(record.into())),
        }
    }

    fn lock_slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, VaultError> {
        self.slot
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".to_string()))
    }
}

impl VaultStore for MemoryVaultStore {
    fn load(&self) -> Result<Option<String>, VaultError> {
        Ok(self.lock_slot()?.clone())
    }

    fn store(&self, record: &str) -> Result<(), VaultError> {
        *self.lock_slot()? = Some(record.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), VaultError> {
        *self.lock_slot()? = None;
        Ok(())
    }
}
