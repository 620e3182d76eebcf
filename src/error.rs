use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Result alias for store operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can resolve a store operation.
///
/// Every failure carries a human-readable message; nothing is retried or
/// recovered internally, callers display the message as-is.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Email and password did not match any known account.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Another account already uses the supplied email.
    #[error("email `{0}` is already in use")]
    EmailTaken(String),
    /// Requested record was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Persistence backend failed; carries the backend's own message so
    /// callers can display it as-is.
    #[error("{0}")]
    Unavailable(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_display_keeps_the_storage_cause() {
        let source = std::io::Error::other("disk gone");
        let err = ServiceError::from(StorageError::unavailable(
            "could not write `data/boardhub.json`".into(),
            source,
        ));

        assert_eq!(
            err.to_string(),
            "storage unavailable: could not write `data/boardhub.json`"
        );
    }
}
