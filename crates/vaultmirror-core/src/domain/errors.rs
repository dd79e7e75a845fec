//! Domain error types
//!
//! Errors raised while validating paths and connection settings.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A connection setting could not be interpreted
    #[error("Invalid setting {field}: {message}")]
    InvalidSetting {
        /// Settings key, e.g. `POSTGRES_PORT`
        field: String,
        /// Human-readable explanation
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidPath("a/../b".to_string());
        assert_eq!(err.to_string(), "Invalid path: a/../b");

        let err = DomainError::InvalidSetting {
            field: "S3_PORT".to_string(),
            message: "not a port number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid setting S3_PORT: not a port number");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidPath("/path".to_string());
        let err2 = DomainError::InvalidPath("/path".to_string());
        let err3 = DomainError::InvalidPath("/other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
