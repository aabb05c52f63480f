use thiserror::Error;

use crate::imaging::ImagingError;
use crate::storage::StorageError;

/// Failure of a batch, or of one file inside it
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No files provided")]
    NoFiles,

    #[error("{file_name}: invalid base64 payload: {source}")]
    InvalidBase64 {
        file_name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("{file_name}: {source}")]
    Image {
        file_name: String,
        #[source]
        source: ImagingError,
    },

    #[error("{file_name}: {source}")]
    Storage {
        file_name: String,
        #[source]
        source: StorageError,
    },

    #[error("{file_name}: worker task failed: {source}")]
    Join {
        file_name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl BatchError {
    /// Name of the file this error belongs to, if any
    pub fn file_name(&self) -> Option<&str> {
        match self {
            BatchError::NoFiles => None,
            BatchError::InvalidBase64 { file_name, .. }
            | BatchError::Image { file_name, .. }
            | BatchError::Storage { file_name, .. }
            | BatchError::Join { file_name, .. } => Some(file_name),
        }
    }
}
