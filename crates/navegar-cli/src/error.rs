//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// The invocation itself is invalid; reported before any browser
    /// is launched
    #[error("{message}")]
    Usage {
        /// Error message
        message: String,
    },

    /// Browser automation error
    #[error("{0}")]
    Navegar(#[from] navegar::NavegarError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a usage error
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_displays_bare_message() {
        let err = CliError::usage("Invalid JSON data");
        assert_eq!(err.to_string(), "Invalid JSON data");
    }

    #[test]
    fn test_navegar_error_passes_through() {
        let err: CliError = navegar::NavegarError::element_timeout("#btn", 10_000).into();
        assert!(err.to_string().contains("#btn"));
        assert!(err.to_string().contains("10000ms"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
