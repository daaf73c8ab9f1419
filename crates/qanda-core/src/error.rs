use thiserror::Error;

/// Canonical error type for domain and storage operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity was not found, or the caller may not learn that it exists.
    #[error("{entity} `{id}` was not found")]
    NotFound {
        /// Entity type name (e.g. `"question"`).
        entity: &'static str,
        /// Identifier of the missing entity.
        id: String,
    },

    /// Entity already exists and cannot be created again.
    #[error("{entity} `{id}` already exists")]
    AlreadyExists {
        /// Entity type name (e.g. `"member"`).
        entity: &'static str,
        /// Identifier that conflicts.
        id: String,
    },

    /// Caller is neither the resource owner nor an admin.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Human-readable explanation of the denied operation.
        message: String,
    },

    /// Operation is illegal for the entity's current lifecycle state.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Human-readable explanation of the invalid state.
        message: String,
    },

    /// Bearer token is past its expiration instant.
    #[error("token has expired")]
    ExpiredToken,

    /// Bearer token signature does not verify against the service key.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Input data failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Blob storage backend failure.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Unexpected internal error occurred.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable details for debugging purposes.
        message: String,
    },

    /// I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an `AlreadyExists` variant.
    #[must_use]
    pub fn already_exists(entity: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.into(),
        }
    }

    /// Creates an `Unauthorized` variant.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates an `InvalidState` variant.
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Creates a `ValidationError` variant.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Creates an `Internal` variant.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenient result alias for domain operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = CoreError::not_found("question", "q-1");
        assert_eq!(err.to_string(), "question `q-1` was not found");
    }

    #[test]
    fn token_errors_are_distinct() {
        assert_ne!(
            CoreError::ExpiredToken.to_string(),
            CoreError::InvalidSignature.to_string()
        );
    }
}
