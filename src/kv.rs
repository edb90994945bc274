//! Durable key-value surfaces the persistence adapter writes through to.
use std::{
    collections::HashMap,
    fs::{self, File},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::{debug, error, info, trace, warn};
use tempfile::NamedTempFile;
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

use crate::{RestoreSummary, Result, ShelfError};

const VALUE_EXTENSION: &str = "kv";

/// A string-to-string store that survives process restarts
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store backed by a HashMap
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    values: HashMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store keeping one file per key in a directory
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Opens the store, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            debug!("Data directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                ShelfError::DirectoryError { path: dir.clone() }
            })?;
        }
        Ok(Self { dir })
    }

    /// Directory holding one file per key
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ShelfError::InvalidFormat {
                message: format!("Invalid storage key: {:?}", key),
            });
        }
        Ok(self.dir.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }

    /// Every key currently stored, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == VALUE_EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    keys.push(stem.to_string_lossy().to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Writes every key into a timestamped zip archive in `backup_dir`,
    /// keeping at most `max_backups` archives (0 keeps all).
    pub fn create_backup(&self, backup_dir: &Path, max_backups: usize) -> Result<PathBuf> {
        if !backup_dir.exists() {
            fs::create_dir_all(backup_dir).map_err(|e| ShelfError::BackupFailed {
                message: e.to_string(),
            })?;
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_path = backup_dir.join(format!("edushelf_backup_{}.zip", timestamp));

        let file = File::create(&backup_path).map_err(|e| ShelfError::BackupFailed {
            message: e.to_string(),
        })?;
        let mut zip = ZipWriter::new(file);

        let keys = self.keys()?;
        for key in &keys {
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .unix_permissions(0o644);
            let value = self.get(key)?.unwrap_or_default();
            zip.start_file(key.as_str(), options)?;
            zip.write_all(value.as_bytes())
                .map_err(|e| ShelfError::BackupFailed {
                    message: format!("Failed to write key {} to backup: {}", key, e),
                })?;
        }
        zip.finish()?;

        self.cleanup_old_backups(backup_dir, max_backups)?;

        info!(
            "Backup created with {} keys at {}",
            keys.len(),
            backup_path.display()
        );
        Ok(backup_path)
    }

    fn cleanup_old_backups(&self, backup_dir: &Path, max_backups: usize) -> Result<()> {
        if max_backups == 0 {
            return Ok(());
        }

        // Names embed the timestamp, so lexical order is age order
        let mut backups: Vec<PathBuf> = fs::read_dir(backup_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with("edushelf_backup_"))
                    && path.extension().is_some_and(|ext| ext == "zip")
            })
            .collect();
        backups.sort();

        while backups.len() > max_backups {
            let oldest = backups.remove(0);
            debug!("Removing old backup: {}", oldest.display());
            if let Err(e) = fs::remove_file(&oldest) {
                warn!("Failed to remove old backup {}: {}", oldest.display(), e);
            }
        }
        Ok(())
    }

    /// Writes every entry of a backup archive back into the store
    pub fn restore_backup(&mut self, backup_path: &Path) -> Result<RestoreSummary> {
        if !backup_path.is_file() {
            return Err(ShelfError::FileNotFound {
                file_path: backup_path.display().to_string(),
            });
        }

        let backup_file = File::open(backup_path).map_err(|e| ShelfError::BackupFailed {
            message: format!("Failed to open backup file: {}", e),
        })?;
        let mut archive = ZipArchive::new(backup_file)?;

        let mut keys_restored = Vec::new();
        let mut failed_keys = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| ShelfError::BackupFailed {
                message: format!("Failed to read ZIP entry: {}", e),
            })?;
            if entry.is_dir() {
                continue;
            }

            let key = entry.name().to_string();
            let mut value = String::new();
            let restored = entry
                .read_to_string(&mut value)
                .map_err(ShelfError::Io)
                .and_then(|_| self.set(&key, &value));

            match restored {
                Ok(()) => keys_restored.push(key),
                Err(e) => {
                    warn!("Failed to restore key {}: {}", key, e);
                    failed_keys.push((key, e.to_string()));
                }
            }
        }

        info!(
            "Backup restoration complete: restored {}, failed {} keys from {}",
            keys_restored.len(),
            failed_keys.len(),
            backup_path.display()
        );

        Ok(RestoreSummary {
            backup_file: backup_path.to_path_buf(),
            keys_restored,
            failed_keys,
        })
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                trace!("Read key {} from {}", key, path.display());
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                Err(ShelfError::Io(e))
            }
        }
    }

    /// Atomic write through a temporary file in the same directory
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            ShelfError::Io(e)
        })?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            ShelfError::Io(e.error)
        })?;

        trace!("Wrote key {} to {}", key, path.display());
        Ok(())
    }
}
