//! Error types for cf-filler operations.

use crate::enums::RequestKind;
use thiserror::Error;

/// The main error type for credential generation.
///
/// The first five variants are the generation taxonomy: every factory maps
/// its failures onto one of them. [`FillerError::Request`] is added by the
/// orchestrator to say which plan entry was being produced.
#[derive(Error, Debug)]
pub enum FillerError {
    /// The secure random source failed to supply entropy
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// RSA or SSH key generation failed
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Certificate authority creation or self-signing failed
    #[error("CA init error: {0}")]
    CaInit(String),

    /// Leaf certificate construction or signing failed
    #[error("Certificate signing error: {0}")]
    CertSigning(String),

    /// PEM or text encoding of generated material failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The generation plan is invalid
    #[error("Plan error: {0}")]
    Plan(String),

    /// A derived value template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A generation failure attributed to the plan entry that caused it
    #[error("generate {kind} '{name}': {source}")]
    Request {
        /// Category of the failing request
        kind: RequestKind,
        /// Target name(s) of the failing request
        name: String,
        /// Underlying failure
        #[source]
        source: Box<FillerError>,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal bug - should never happen in production
    #[error("Bug detected: {0}\n\nThis is an internal error. Please report this issue at:\nhttps://github.com/rosenhouse/cf-filler/issues")]
    Bug(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl FillerError {
    /// Attach the originating request to an error.
    pub fn for_request(self, kind: RequestKind, name: impl Into<String>) -> Self {
        FillerError::Request {
            kind,
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any request context.
    pub fn root(&self) -> &FillerError {
        match self {
            FillerError::Request { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A specialized Result type for cf-filler operations.
pub type Result<T> = std::result::Result<T, FillerError>;

/// Helper macro to create and return a FillerError::Bug
///
/// This should be used for conditions that should never occur
/// in normal operation and indicate a bug in cf-filler itself.
///
/// # Example
///
/// ```ignore
/// if some_impossible_condition {
///     bug!("This should never happen: {:?}", condition);
/// }
/// ```
#[macro_export]
macro_rules! bug {
    ($msg:expr) => {
        return Err($crate::FillerError::Bug($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::FillerError::Bug(format!($fmt, $($arg)*)))
    };
}

/// Helper macro to bail out with a FillerError
///
/// This is used for expected error conditions.
///
/// # Example
///
/// ```ignore
/// if count == 0 {
///     bail!(Plan, "password array '{}' must request at least one password", name);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::FillerError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::FillerError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::FillerError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::FillerError::Other(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_in_message() {
        let err = FillerError::RandomSource("entropy pool unavailable".to_string())
            .for_request(RequestKind::Password, "nats_password");

        assert_eq!(
            err.to_string(),
            "generate password 'nats_password': Random source error: entropy pool unavailable"
        );
        assert!(matches!(err.root(), FillerError::RandomSource(_)));
    }

    #[test]
    fn test_bail_macro() {
        fn check(count: usize) -> Result<()> {
            if count == 0 {
                bail!(Plan, "count for '{}' must be positive", "consul_encrypt_keys");
            }
            Ok(())
        }

        assert!(check(1).is_ok());
        match check(0) {
            Err(FillerError::Plan(msg)) => assert!(msg.contains("consul_encrypt_keys")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
