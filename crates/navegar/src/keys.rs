//! Key name resolution for synthesized keyboard input.
//!
//! CDP key events want a key name, optional text, and a Windows virtual
//! key code. Named keys carry the code the browser expects; single
//! printable characters pass through as themselves.

use crate::error::{NavegarError, Result};

/// A resolved key ready to dispatch as keydown/keyup events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// DOM key value (e.g. "Enter", "a")
    pub key: String,
    /// Text produced by the key, if any
    pub text: Option<String>,
    /// Windows virtual key code, if known
    pub code: Option<i64>,
}

impl KeyInput {
    fn named(key: &str, text: Option<&str>, code: i64) -> Self {
        Self {
            key: key.to_string(),
            text: text.map(String::from),
            code: Some(code),
        }
    }
}

/// Resolve a key name as passed on the command line.
///
/// Accepts the common named keys and any single printable character.
///
/// # Errors
///
/// Returns an error for unrecognized multi-character names.
pub fn resolve(name: &str) -> Result<KeyInput> {
    let resolved = match name {
        "Enter" => KeyInput::named("Enter", Some("\r"), 13),
        "Tab" => KeyInput::named("Tab", None, 9),
        "Escape" => KeyInput::named("Escape", None, 27),
        "Backspace" => KeyInput::named("Backspace", None, 8),
        "Delete" => KeyInput::named("Delete", None, 46),
        "ArrowLeft" => KeyInput::named("ArrowLeft", None, 37),
        "ArrowUp" => KeyInput::named("ArrowUp", None, 38),
        "ArrowRight" => KeyInput::named("ArrowRight", None, 39),
        "ArrowDown" => KeyInput::named("ArrowDown", None, 40),
        "Home" => KeyInput::named("Home", None, 36),
        "End" => KeyInput::named("End", None, 35),
        "PageUp" => KeyInput::named("PageUp", None, 33),
        "PageDown" => KeyInput::named("PageDown", None, 34),
        "Space" => KeyInput::named(" ", Some(" "), 32),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeyInput {
                    key: ch.to_string(),
                    text: Some(ch.to_string()),
                    code: ascii_key_code(ch),
                },
                _ => {
                    return Err(NavegarError::action(format!(
                        "unknown key: {other} (try Enter, Escape, ArrowDown, ArrowUp, Tab, Space)"
                    )))
                }
            }
        }
    };
    Ok(resolved)
}

/// Virtual key code for plain ASCII letters and digits
fn ascii_key_code(ch: char) -> Option<i64> {
    match ch {
        'a'..='z' => Some(ch.to_ascii_uppercase() as i64),
        'A'..='Z' | '0'..='9' => Some(ch as i64),
        ' ' => Some(32),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_carries_carriage_return_text() {
        let key = resolve("Enter").unwrap();
        assert_eq!(key.key, "Enter");
        assert_eq!(key.text.as_deref(), Some("\r"));
        assert_eq!(key.code, Some(13));
    }

    #[test]
    fn test_named_keys_resolve() {
        for name in [
            "Tab",
            "Escape",
            "Backspace",
            "Delete",
            "ArrowLeft",
            "ArrowUp",
            "ArrowRight",
            "ArrowDown",
            "Home",
            "End",
            "PageUp",
            "PageDown",
            "Space",
        ] {
            assert!(resolve(name).is_ok(), "{name} should resolve");
        }
    }

    #[test]
    fn test_single_character_passes_through() {
        let key = resolve("a").unwrap();
        assert_eq!(key.key, "a");
        assert_eq!(key.text.as_deref(), Some("a"));
        assert_eq!(key.code, Some(65));
    }

    #[test]
    fn test_digit_key_code() {
        let key = resolve("7").unwrap();
        assert_eq!(key.code, Some('7' as i64));
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let err = resolve("SuperJump").unwrap_err();
        assert!(err.to_string().contains("unknown key"));
    }

    #[test]
    fn test_space_maps_to_literal_space() {
        let key = resolve("Space").unwrap();
        assert_eq!(key.key, " ");
        assert_eq!(key.text.as_deref(), Some(" "));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_printable_ascii_always_resolves(ch in proptest::char::range('!', '~')) {
                let key = resolve(&ch.to_string()).unwrap();
                prop_assert_eq!(key.key, ch.to_string());
                prop_assert_eq!(key.text, Some(ch.to_string()));
            }

            #[test]
            fn prop_letter_codes_are_uppercase_ascii(ch in proptest::char::range('a', 'z')) {
                let key = resolve(&ch.to_string()).unwrap();
                prop_assert_eq!(key.code, Some(ch.to_ascii_uppercase() as i64));
            }
        }
    }
}
