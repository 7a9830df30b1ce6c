//! Error types for browser automation.
//!
//! Every failure during a run maps onto one of these variants. All of them
//! are terminal for the invocation: nothing here is retried.

use thiserror::Error;

/// Errors raised while driving a browser session.
#[derive(Debug, Error)]
pub enum NavegarError {
    /// Browser could not be launched, closed, or spoken to over CDP.
    #[error("Browser error: {message}")]
    Browser {
        /// Human-readable failure description
        message: String,
    },

    /// Page navigation failed.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Human-readable failure description
        message: String,
    },

    /// A selector did not appear within its timeout.
    #[error("Timed out after {timeout_ms}ms waiting for selector: {selector}")]
    ElementTimeout {
        /// Selector that never matched
        selector: String,
        /// Timeout bound in milliseconds
        timeout_ms: u64,
    },

    /// The single requested interaction failed.
    #[error("Action failed: {message}")]
    Action {
        /// Human-readable failure description
        message: String,
    },

    /// Script evaluation failed.
    #[error("Evaluation failed: {message}")]
    Evaluate {
        /// Human-readable failure description
        message: String,
    },

    /// I/O error (artifact writes, directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NavegarError {
    /// Create a browser error
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an element timeout error
    pub fn element_timeout(selector: impl Into<String>, timeout_ms: u64) -> Self {
        Self::ElementTimeout {
            selector: selector.into(),
            timeout_ms,
        }
    }

    /// Create an action error
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action {
            message: message.into(),
        }
    }

    /// Create an evaluation error
    pub fn evaluate(message: impl Into<String>) -> Self {
        Self::Evaluate {
            message: message.into(),
        }
    }
}

/// Result alias for browser automation operations
pub type Result<T> = std::result::Result<T, NavegarError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_error_display() {
        let err = NavegarError::browser("chromium not found");
        assert_eq!(err.to_string(), "Browser error: chromium not found");
    }

    #[test]
    fn test_navigation_error_display() {
        let err = NavegarError::navigation("https://example.com", "DNS failure");
        assert_eq!(
            err.to_string(),
            "Navigation to https://example.com failed: DNS failure"
        );
    }

    #[test]
    fn test_element_timeout_display_carries_selector_and_bound() {
        let err = NavegarError::element_timeout("#login", 500);
        let text = err.to_string();
        assert!(text.contains("#login"));
        assert!(text.contains("500ms"));
    }

    #[test]
    fn test_action_error_display() {
        let err = NavegarError::action("no option with value XX");
        assert_eq!(err.to_string(), "Action failed: no option with value XX");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: NavegarError = io.into();
        assert!(matches!(err, NavegarError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: NavegarError = json.into();
        assert!(matches!(err, NavegarError::Json(_)));
    }
}
