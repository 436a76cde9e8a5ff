//! Error types for the spy facade.
//!
//! Failures internal to discovery and registry building are absorbed and
//! logged where they happen; only genuine caller-facing contract breaches
//! surface through these types.

use thiserror::Error;

pub type SpyResult<T> = Result<T, SpyError>;

/// Errors surfaced by the spy facade.
#[derive(Debug, Error)]
pub enum SpyError {
    /// A driver accepted a URL but returned no connection for it.
    #[error("invalid or unknown driver url: {url}")]
    InvalidUrl { url: String },

    /// The facade could not be registered with the driver manager.
    #[error("could not register spy driver: {reason}")]
    Registration { reason: String },

    /// An argument-less query was made before any underlying driver was
    /// resolved.
    #[error("{operation} is not supported: no underlying driver has been resolved")]
    NotSupported { operation: String },

    /// An underlying driver reported a failure.
    #[error("driver error: {message}")]
    Driver { message: String },
}

impl SpyError {
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn registration(reason: impl Into<String>) -> Self {
        Self::Registration {
            reason: reason.into(),
        }
    }

    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_names_the_offending_url() {
        let err = SpyError::invalid_url("postgres://nowhere/db");
        assert_eq!(
            err.to_string(),
            "invalid or unknown driver url: postgres://nowhere/db"
        );
    }

    #[test]
    fn not_supported_names_the_operation() {
        let err = SpyError::not_supported("log_target");
        assert!(err.to_string().contains("log_target"));
        assert!(err.to_string().contains("not supported"));
    }
}
