//! Object storage failures.

use docsearch_core::{Error as CoreError, ErrorKind as CoreErrorKind};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The operator could not be built from the configuration.
    #[error("storage backend could not be initialized: {0}")]
    Init(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("access to object denied: {0}")]
    PermissionDenied(String),

    /// A caller supplied identifier that does not map to a safe object path.
    #[error("invalid object path: {0}")]
    InvalidPath(String),

    /// The object exists but does not hold the expected JSON document.
    #[error("object content is malformed: {0}")]
    InvalidContent(String),

    #[error(transparent)]
    Backend(opendal::Error),
}

impl StorageError {
    pub fn init(reason: impl Into<String>) -> Self {
        Self::Init(reason.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Self::InvalidPath(reason.into())
    }

    pub fn invalid_content(reason: impl Into<String>) -> Self {
        Self::InvalidContent(reason.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(error: opendal::Error) -> Self {
        match error.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound(error.to_string()),
            opendal::ErrorKind::PermissionDenied => Self::PermissionDenied(error.to_string()),
            _ => Self::Backend(error),
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(error: StorageError) -> Self {
        let kind = match &error {
            StorageError::NotFound(_) => CoreErrorKind::NotFound,
            StorageError::InvalidPath(_) => CoreErrorKind::InvalidInput,
            StorageError::InvalidContent(_) => CoreErrorKind::Serialization,
            StorageError::Init(_) => CoreErrorKind::Configuration,
            StorageError::PermissionDenied(_) | StorageError::Backend(_) => {
                CoreErrorKind::Provider
            }
        };
        CoreError::new(kind)
            .with_message(error.to_string())
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opendal_not_found_maps_to_not_found() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "missing object");
        let storage = StorageError::from(err);
        assert!(matches!(storage, StorageError::NotFound(_)));

        let core = CoreError::from(storage);
        assert_eq!(core.kind(), CoreErrorKind::NotFound);
    }

    #[test]
    fn other_opendal_errors_are_provider_failures() {
        let err = opendal::Error::new(opendal::ErrorKind::Unexpected, "boom");
        let core = CoreError::from(StorageError::from(err));
        assert_eq!(core.kind(), CoreErrorKind::Provider);
    }
}
