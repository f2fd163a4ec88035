use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("unknown attribute '{0}' (expected one of id, date, amount, type, category, description, currency)")]
    UnknownAttribute(String),

    #[error("invalid mapping '{0}' (expected attribute=column)")]
    InvalidAssignment(String),

    #[error("invalid storage key '{0}' (use a plain name without path separators)")]
    InvalidKey(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored data under '{key}' is not a valid transaction list: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize transactions: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
