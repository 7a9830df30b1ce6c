//! JavaScript dialog handling.
//!
//! A dialog handler is registered before navigation; every dialog raised
//! while the page is open is resolved with the configured action and
//! recorded in arrival order.

use std::fmt;

use serde::Serialize;

/// Kind of JavaScript dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    /// `alert()` dialog
    Alert,
    /// `confirm()` dialog
    Confirm,
    /// `prompt()` dialog
    Prompt,
    /// `beforeunload` confirmation
    BeforeUnload,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alert => "alert",
            Self::Confirm => "confirm",
            Self::Prompt => "prompt",
            Self::BeforeUnload => "beforeunload",
        };
        write!(f, "{name}")
    }
}

/// What to do with each dialog the page raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    /// Accept the dialog
    Accept,
    /// Accept, supplying prompt text
    AcceptWith(String),
    /// Dismiss the dialog
    Dismiss,
}

impl DialogAction {
    /// Whether this action accepts the dialog
    #[must_use]
    pub const fn accepts(&self) -> bool {
        matches!(self, Self::Accept | Self::AcceptWith(_))
    }

    /// Prompt text to supply, if any
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        match self {
            Self::AcceptWith(text) => Some(text),
            Self::Accept | Self::Dismiss => None,
        }
    }
}

/// One dialog observed and resolved during the watch window.
#[derive(Debug, Clone, Serialize)]
pub struct DialogRecord {
    /// Dialog kind
    #[serde(rename = "type")]
    pub kind: DialogKind,
    /// Dialog message text
    pub message: String,
    /// Whether the dialog was accepted
    pub accepted: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_is_lowercase() {
        assert_eq!(DialogKind::Alert.to_string(), "alert");
        assert_eq!(DialogKind::Confirm.to_string(), "confirm");
        assert_eq!(DialogKind::Prompt.to_string(), "prompt");
        assert_eq!(DialogKind::BeforeUnload.to_string(), "beforeunload");
    }

    #[test]
    fn test_accepts() {
        assert!(DialogAction::Accept.accepts());
        assert!(DialogAction::AcceptWith("hi".to_string()).accepts());
        assert!(!DialogAction::Dismiss.accepts());
    }

    #[test]
    fn test_prompt_text_only_for_accept_with() {
        assert_eq!(DialogAction::Accept.prompt_text(), None);
        assert_eq!(DialogAction::Dismiss.prompt_text(), None);
        assert_eq!(
            DialogAction::AcceptWith("My Input".to_string()).prompt_text(),
            Some("My Input")
        );
    }

    #[test]
    fn test_record_serializes_kind_as_type() {
        let record = DialogRecord {
            kind: DialogKind::Prompt,
            message: "Your name?".to_string(),
            accepted: true,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "prompt");
        assert_eq!(json["accepted"], true);
    }
}
