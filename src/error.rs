use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the llm-assist library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A selection was requested over zero candidates.
    #[error("Cannot select a best candidate from an empty candidate set")]
    EmptyCandidateSet,

    /// Chunk window would never advance.
    #[error("Invalid chunk configuration: chunk_size ({chunk_size}) must be greater than overlap ({overlap})")]
    InvalidChunkConfiguration {
        /// Requested window size in words
        chunk_size: usize,
        /// Requested overlap in words
        overlap: usize,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// No API key could be found for the completion provider.
    #[error("No API key configured. Set {var} in the environment or a .env file, or pass --api-key")]
    MissingApiKey {
        /// Environment variable that was consulted
        var: String,
    },

    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// Transport-level failure talking to the provider.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("Completion API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error message
        message: String,
    },

    /// The provider answered without any completion text.
    #[error("Model '{model}' returned no completion text")]
    EmptyResponse {
        /// Model that was queried
        model: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: &tera::Error) -> Self {
        // Tera nests the useful part of the message in the source chain.
        let mut message = source.to_string();
        let mut cause = std::error::Error::source(source);
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }

        Self::Template {
            template: template.into(),
            message,
        }
    }

    /// Creates an invalid chunk configuration error.
    #[must_use]
    pub const fn invalid_chunk_configuration(chunk_size: usize, overlap: usize) -> Self {
        Self::InvalidChunkConfiguration {
            chunk_size,
            overlap,
        }
    }

    /// Creates an API status error.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::InvalidChunkConfiguration { .. }
                | Self::MissingApiKey { .. }
        )
    }

    /// Returns true if the error came from talking to the completion provider.
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Api { .. } | Self::EmptyResponse { .. }
        )
    }
}

impl From<tera::Error> for Error {
    fn from(e: tera::Error) -> Self {
        Self::template("unknown", &e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Http {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_chunk_configuration_error() {
        let err = Error::invalid_chunk_configuration(50, 50);
        assert!(err.is_config());
        assert!(err.to_string().contains("chunk_size (50)"));
        assert!(err.to_string().contains("overlap (50)"));
    }

    #[test]
    fn test_provider_errors() {
        assert!(Error::api(401, "bad key").is_provider());
        assert!(Error::api(401, "bad key").to_string().contains("401"));
        assert!(
            Error::EmptyResponse {
                model: "m".to_string()
            }
            .is_provider()
        );
        assert!(!Error::EmptyCandidateSet.is_provider());
    }

    #[test]
    fn test_error_clone() {
        let err = Error::config("test");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }
}
