use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("malformed document: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unsupported document version {0:?}")]
    UnsupportedVersion(String),

    #[error("document not encodable: {0}")]
    Encode(String),

    #[error("failed to read {path}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file: {0}")]
    SettingsDecode(#[source] serde_json::Error),

    #[error("failed to serialize settings: {0}")]
    SettingsEncode(#[source] serde_json::Error),

    #[error("failed to load settings: {read}")]
    SettingsLoad {
        /// The original read or decode failure.
        read: Box<AppError>,
        /// Whatever went wrong while saving the default fallback, if anything.
        save: Option<Box<AppError>>,
    },
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
