use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend could not be reached or written.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failed operation.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A value could not be serialized for persistence.
    #[error("could not encode `{context}` for persistence")]
    Encode {
        /// What was being encoded, for the error message.
        context: String,
        /// Underlying serialization failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an encode error for the given context.
    pub fn encode(context: impl Into<String>, source: serde_json::Error) -> Self {
        StorageError::Encode {
            context: context.into(),
            source,
        }
    }
}
