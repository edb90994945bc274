//! Error types for the edushelf application.
//!
//! Store operations never surface these: a failed publication, an unknown
//! favorite or a corrupt persisted value all leave state unchanged. The
//! errors below belong to the outer layers (configuration, datasets,
//! durable storage, backups and the CLI).

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the edushelf application.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to zip operations.
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// A class dataset could not be read or has an unexpected shape.
    #[error("Invalid dataset {class}: {message}")]
    DatasetError { class: String, message: String },

    /// Invalid value format.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Item was not found when performing an operation.
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    /// Errors related to backup operations.
    #[error("Backup failed: {message}")]
    BackupFailed { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
